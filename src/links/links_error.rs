//! Error types for links storage backends.
//!
//! This module defines the error type shared by every backend implementing
//! [`Links`](super::Links), from the in-process doublets stores to the Neo4j client.

use thiserror::Error;

use super::LinkId;
use crate::mem::MemError;

/// An enumeration of all the error types a links backend can report.
#[derive(Debug, Error)]
pub enum LinksError {
    /// The link addressed by an update, delete or lookup does not exist.
    #[error("Link {0} does not exist")]
    NotExists(LinkId),

    /// A query slice whose length is neither 0, 1 nor 3.
    #[error("Invalid query: size {0} is neither 0, 1 nor 3")]
    InvalidQuery(usize),

    /// A change slice that is not `[index, source, target]`.
    #[error("Invalid change: size {0} is not 3")]
    InvalidChange(usize),

    /// An error raised by the memory a store is built on.
    #[error("Memory Error: {0}")]
    Mem(#[from] MemError),

    /// Transport level failure while talking to Neo4j.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Neo4j accepted the request but reported a Cypher error.
    #[error("Cypher Error {code}: {message}")]
    Cypher { code: String, message: String },

    /// Neo4j answered with something that cannot be read as links.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The async runtime driving the HTTP client could not be built.
    #[error("Runtime Error: {0}")]
    Runtime(#[from] std::io::Error),

    /// A mutex guarding backend state was poisoned.
    #[error("Mutex Lock Error")]
    LockPoisoned,
}
