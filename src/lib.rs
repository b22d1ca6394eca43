//! # linksneo4j
//!
//! A benchmark harness comparing a native links (doublets) store against
//! Neo4j on the same set of operations.
//!
//! Links are `(index, source, target)` triples. Every backend implements the
//! [`Links`] primitives and the [`Doublets`] convenience API on top of them,
//! so the benchmark workloads run unchanged against:
//!
//! - the united and split layouts of the native store, each either in memory
//!   or backed by a file;
//! - Neo4j over its HTTP API, either auto-committing every statement or
//!   running inside an explicit transaction.
//!
//! The `bench-report` binary turns the benchmark output into the Markdown
//! comparison table.

/// The links data model and backend traits.
pub mod links;

/// Raw cell memories the native stores are built on.
pub mod mem;

/// The native doublets store in its united and split layouts.
pub mod store;

/// The Neo4j backend.
pub mod neo4j;

/// Benchmark lifecycle, configuration and workloads.
pub mod bench;

/// Results table generation.
pub mod report;

pub mod logging;

pub use bench::{measure, Backend, BenchConfig, BenchConfigBuilder, Benched, Fork, Operation};
pub use links::{Doublets, Flow, Link, LinkId, Links, LinksConstants, LinksError, Result};
pub use mem::{FileMapped, MemError, RawMem, Volatile};
pub use neo4j::{connect, Client, Neo4jConfig, Neo4jConfigBuilder, Transaction};
pub use report::{ReportError, ResultsTable};
pub use store::{
    SplitNonVolatile, SplitStore, SplitVolatile, UnitedNonVolatile, UnitedStore, UnitedVolatile,
};
