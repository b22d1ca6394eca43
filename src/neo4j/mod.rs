//! Neo4j backend.
//!
//! Links are stored as `:Link` nodes carrying `id`, `source` and `target`
//! properties and are manipulated through the Neo4j HTTP Cypher API:
//!
//! - [`Client`] sends every statement to the auto-commit endpoint
//!   `POST /db/{database}/tx/commit`.
//! - [`Transaction`] opens an explicit transaction with `POST /db/{database}/tx`
//!   and runs statements inside it until it is committed or rolled back.
//!
//! Schema set up on connect:
//!
//! ```cypher
//! CREATE CONSTRAINT link_id IF NOT EXISTS FOR (l:Link) REQUIRE l.id IS UNIQUE
//! CREATE INDEX link_source IF NOT EXISTS FOR (l:Link) ON (l.source)
//! CREATE INDEX link_target IF NOT EXISTS FOR (l:Link) ON (l.target)
//! ```

pub mod client;
pub mod cypher;
mod operations;
pub mod transaction;

#[cfg(test)]
mod tests;

use derive_builder::Builder;
use std::{env, time::Duration};

pub use self::{client::Client, transaction::Transaction};
use crate::links::Result;

const DEFAULT_URI: &str = "http://localhost:7474";
const DEFAULT_USER: &str = "neo4j";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_DATABASE: &str = "neo4j";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BOLT_PORT: u16 = 7687;
const HTTP_PORT: u16 = 7474;

/// Connection settings for a Neo4j server.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Neo4jConfig {
    /// Server address. `bolt://` addresses are mapped onto the HTTP connector.
    #[builder(default = "DEFAULT_URI.to_string()")]
    pub uri: String,
    #[builder(default = "DEFAULT_USER.to_string()")]
    pub user: String,
    #[builder(default = "DEFAULT_PASSWORD.to_string()")]
    pub password: String,
    #[builder(default = "DEFAULT_DATABASE.to_string()")]
    pub database: String,
    #[builder(default = "DEFAULT_TIMEOUT")]
    pub timeout: Duration,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Neo4jConfig {
    /// Reads `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());
        Self {
            uri: var("NEO4J_URI", DEFAULT_URI),
            user: var("NEO4J_USER", DEFAULT_USER),
            password: var("NEO4J_PASSWORD", DEFAULT_PASSWORD),
            database: var("NEO4J_DATABASE", DEFAULT_DATABASE),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL of the HTTP API.
    ///
    /// A bolt address on the default bolt port maps to the default HTTP port;
    /// any other port is kept as given.
    pub fn http_base(&self) -> String {
        let uri = self.uri.trim_end_matches('/');
        let bolt = uri
            .strip_prefix("bolt://")
            .or_else(|| uri.strip_prefix("neo4j://"));
        match bolt {
            Some(rest) => {
                let parsed = rest
                    .rsplit_once(':')
                    .and_then(|(host, port)| port.parse::<u16>().ok().map(|port| (host, port)));
                let (host, port) = match parsed {
                    Some((host, BOLT_PORT)) => (host, HTTP_PORT),
                    Some((host, port)) => (host, port),
                    None => (rest, HTTP_PORT),
                };
                format!("http://{host}:{port}")
            }
            None if uri.starts_with("http://") || uri.starts_with("https://") => uri.to_string(),
            None => format!("http://{uri}"),
        }
    }
}

/// Connects to the server described by the environment.
pub fn connect() -> Result<Client> {
    Client::new(&Neo4jConfig::from_env())
}
