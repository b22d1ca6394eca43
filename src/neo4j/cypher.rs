//! Cypher statements and the JSON shapes of the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::links::{Link, LinkId, LinksError, QueryKind, Result};

const RETURN_LINKS: &str = "RETURN l.id AS id, l.source AS source, l.target AS target";
const RETURN_COUNT: &str = "RETURN count(l) AS count";

/// Body of a request to a transaction endpoint.
#[derive(Debug, Serialize)]
pub struct CypherRequest {
    pub statements: Vec<Statement>,
}

/// A single parameterized statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub statement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl Statement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Response of a transaction endpoint.
#[derive(Debug, Deserialize)]
pub struct CypherResponse {
    #[serde(default)]
    pub results: Vec<QueryResult>,
    #[serde(default)]
    pub errors: Vec<CypherError>,
    /// Commit URL, present while an explicit transaction is open.
    #[serde(default)]
    pub commit: Option<String>,
}

impl CypherResponse {
    /// Turns the first reported error into a [`LinksError::Cypher`].
    pub fn into_results(self) -> Result<Vec<QueryResult>> {
        match self.errors.into_iter().next() {
            Some(error) => Err(LinksError::Cypher {
                code: error.code,
                message: error.message,
            }),
            None => Ok(self.results),
        }
    }
}

/// Result of a single statement.
#[derive(Debug, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<RowData>,
}

impl QueryResult {
    /// Reads every row as `(id, source, target)`.
    pub fn links(&self) -> Result<Vec<Link>> {
        self.data.iter().map(RowData::link).collect()
    }

    /// Reads the first column of the first row, `0` when there are no rows.
    pub fn scalar(&self) -> Result<u64> {
        match self.data.first().and_then(|row| row.row.first()) {
            None | Some(Value::Null) => Ok(0),
            Some(value) => as_id(value),
        }
    }
}

/// A single row of a statement result.
#[derive(Debug, Deserialize)]
pub struct RowData {
    pub row: Vec<Value>,
}

impl RowData {
    pub fn link(&self) -> Result<Link> {
        match self.row.as_slice() {
            [index, source, target, ..] => Ok(Link::new(as_id(index)?, as_id(source)?, as_id(target)?)),
            row => Err(LinksError::UnexpectedResponse(format!(
                "expected 3 columns, got {}",
                row.len()
            ))),
        }
    }
}

/// Error reported by Neo4j.
#[derive(Debug, Deserialize)]
pub struct CypherError {
    pub code: String,
    pub message: String,
}

fn as_id(value: &Value) -> Result<LinkId> {
    value
        .as_u64()
        .ok_or_else(|| LinksError::UnexpectedResponse(format!("not a link id: {value}")))
}

pub fn schema() -> [Statement; 3] {
    [
        Statement::new("CREATE CONSTRAINT link_id IF NOT EXISTS FOR (l:Link) REQUIRE l.id IS UNIQUE"),
        Statement::new("CREATE INDEX link_source IF NOT EXISTS FOR (l:Link) ON (l.source)"),
        Statement::new("CREATE INDEX link_target IF NOT EXISTS FOR (l:Link) ON (l.target)"),
    ]
}

pub fn drop_all() -> Statement {
    Statement::new("MATCH (l:Link) DETACH DELETE l")
}

pub fn max_id() -> Statement {
    Statement::new("MATCH (l:Link) RETURN coalesce(max(l.id), 0) AS max_id")
}

pub fn create(index: LinkId, source: LinkId, target: LinkId) -> Statement {
    Statement::new("CREATE (l:Link {id: $id, source: $source, target: $target})")
        .with_parameters(json!({ "id": index, "source": source, "target": target }))
}

pub fn get(index: LinkId) -> Statement {
    Statement::new(format!("MATCH (l:Link {{id: $id}}) {RETURN_LINKS}"))
        .with_parameters(json!({ "id": index }))
}

pub fn update(index: LinkId, source: LinkId, target: LinkId) -> Statement {
    Statement::new("MATCH (l:Link {id: $id}) SET l.source = $source, l.target = $target")
        .with_parameters(json!({ "id": index, "source": source, "target": target }))
}

pub fn delete(index: LinkId) -> Statement {
    Statement::new("MATCH (l:Link {id: $id}) DELETE l").with_parameters(json!({ "id": index }))
}

/// Statement returning the links matching `kind`.
pub fn select(kind: &QueryKind) -> Statement {
    matching(kind, RETURN_LINKS)
}

/// Statement counting the links matching `kind`.
pub fn count(kind: &QueryKind) -> Statement {
    matching(kind, RETURN_COUNT)
}

fn matching(kind: &QueryKind, tail: &str) -> Statement {
    let mut conditions = Vec::new();
    let mut parameters = serde_json::Map::new();
    let pattern = match *kind {
        QueryKind::All => "MATCH (l:Link)",
        QueryKind::Identity {
            index,
            source,
            target,
        } => {
            parameters.insert("id".into(), json!(index));
            if let Some(source) = source {
                conditions.push("l.source = $source");
                parameters.insert("source".into(), json!(source));
            }
            if let Some(target) = target {
                conditions.push("l.target = $target");
                parameters.insert("target".into(), json!(target));
            }
            "MATCH (l:Link {id: $id})"
        }
        QueryKind::Concrete { source, target } => {
            conditions.push("l.source = $source");
            conditions.push("l.target = $target");
            parameters.insert("source".into(), json!(source));
            parameters.insert("target".into(), json!(target));
            "MATCH (l:Link)"
        }
        QueryKind::Outgoing(source) => {
            conditions.push("l.source = $source");
            parameters.insert("source".into(), json!(source));
            "MATCH (l:Link)"
        }
        QueryKind::Incoming(target) => {
            conditions.push("l.target = $target");
            parameters.insert("target".into(), json!(target));
            "MATCH (l:Link)"
        }
    };

    let statement = if conditions.is_empty() {
        format!("{pattern} {tail}")
    } else {
        format!("{pattern} WHERE {} {tail}", conditions.join(" AND "))
    };
    let statement = Statement::new(statement);
    if parameters.is_empty() {
        statement
    } else {
        statement.with_parameters(Value::Object(parameters))
    }
}
