use std::sync::Mutex;

use super::{
    cypher::{CypherResponse, QueryResult, Statement},
    operations::{self, Cypher},
    Client,
};
use crate::links::{
    Doublets, Flow, Link, LinkId, Links, LinksConstants, LinksError, ReadHandler, Result,
    WriteHandler,
};

/// An explicit Neo4j transaction.
///
/// The transaction is opened lazily by the first statement and stays open
/// until [`commit`](Transaction::commit) or [`rollback`](Transaction::rollback).
/// Reads inside it see its own uncommitted writes. Dropping an open
/// transaction rolls it back.
pub struct Transaction<'c> {
    client: &'c Client,
    /// URL of the open transaction, `/db/{database}/tx/{id}`.
    open: Mutex<Option<String>>,
}

impl<'c> Transaction<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self {
            client,
            open: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &'c Client {
        self.client
    }

    pub fn is_open(&self) -> Result<bool> {
        Ok(self.lock()?.is_some())
    }

    /// Runs `statements` inside the transaction, opening it first if needed.
    pub fn execute_all(&self, statements: Vec<Statement>) -> Result<Vec<QueryResult>> {
        let mut open = self.lock()?;
        let url = open.clone().unwrap_or_else(|| self.client.begin_url());
        settle(&mut open, self.client.post(&url, statements))
    }

    /// Commits the open transaction. Does nothing when none is open.
    pub fn commit(&self) -> Result<()> {
        let Some(url) = self.lock()?.take() else {
            return Ok(());
        };
        self.client
            .post(&format!("{url}/commit"), Vec::new())?
            .into_results()?;
        tracing::debug!(%url, "committed transaction");
        Ok(())
    }

    /// Rolls back the open transaction. Does nothing when none is open.
    pub fn rollback(&self) -> Result<()> {
        let Some(url) = self.lock()?.take() else {
            return Ok(());
        };
        self.client.delete_transaction(&url)?;
        tracing::debug!(%url, "rolled back transaction");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.open.lock().map_err(|_| LinksError::LockPoisoned)
    }
}

/// Updates the stored transaction URL from the outcome of a statement post.
///
/// A successful first post opens the transaction at its commit URL minus
/// `/commit`. Any failure closes it: Neo4j rolls a transaction back when one of
/// its statements fails, and a transport error usually means it expired.
pub(crate) fn settle(
    open: &mut Option<String>,
    outcome: Result<CypherResponse>,
) -> Result<Vec<QueryResult>> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            *open = None;
            return Err(e);
        }
    };
    let commit = response.commit.clone();
    let results = match response.into_results() {
        Ok(results) => results,
        Err(e) => {
            *open = None;
            return Err(e);
        }
    };
    if open.is_none() {
        let commit = commit.ok_or_else(|| {
            LinksError::UnexpectedResponse("transaction opened without a commit URL".into())
        })?;
        let url = transaction_url(&commit).to_string();
        tracing::debug!(%url, "opened transaction");
        *open = Some(url);
    }
    Ok(results)
}

/// Strips the `/commit` suffix off a commit URL.
pub(crate) fn transaction_url(commit: &str) -> &str {
    commit.strip_suffix("/commit").unwrap_or(commit)
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let open = match self.open.get_mut() {
            Ok(open) => open.take(),
            Err(_) => return,
        };
        if let Some(url) = open {
            if let Err(e) = self.client.delete_transaction(&url) {
                tracing::warn!(%url, error = %e, "failed to roll back transaction");
            }
        }
    }
}

impl Cypher for Transaction<'_> {
    fn run(&self, statement: Statement) -> Result<QueryResult> {
        let results = self.execute_all(vec![statement])?;
        Ok(results.into_iter().next().unwrap_or_default())
    }

    fn client(&self) -> &Client {
        self.client
    }
}

impl Links for Transaction<'_> {
    fn constants(&self) -> &LinksConstants {
        self.client.constants()
    }

    fn count_links(&self, query: &[LinkId]) -> Result<u64> {
        operations::count_links(self, query)
    }

    fn create_links(&mut self, _query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        operations::create_links(self, handler)
    }

    fn each_links(&self, query: &[LinkId], handler: ReadHandler<'_>) -> Result<Flow> {
        operations::each_links(self, query, handler)
    }

    fn update_links(
        &mut self,
        query: &[LinkId],
        change: &[LinkId],
        handler: WriteHandler<'_>,
    ) -> Result<Flow> {
        operations::update_links(self, query, change, handler)
    }

    fn delete_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        operations::delete_links(self, query, handler)
    }
}

impl Doublets for Transaction<'_> {
    fn get_link(&self, index: LinkId) -> Result<Option<Link>> {
        operations::get_link(self, index)
    }

    fn create_point(&mut self) -> Result<LinkId> {
        operations::create_point(self)
    }
}
