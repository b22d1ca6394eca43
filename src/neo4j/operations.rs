//! `Links` operations shared by the auto-commit client and transactions.

use super::{
    cypher::{self, QueryResult, Statement},
    Client,
};
use crate::links::{
    change_ends, query_index, Flow, Link, LinkId, Links, LinksError, QueryKind, ReadHandler, Result,
    WriteHandler,
};

/// Something able to run a Cypher statement.
pub(crate) trait Cypher {
    fn run(&self, statement: Statement) -> Result<QueryResult>;

    /// The client owning id allocation and constants.
    fn client(&self) -> &Client;
}

pub(crate) fn count_links<C: Cypher>(runner: &C, query: &[LinkId]) -> Result<u64> {
    let kind = QueryKind::classify(query, runner.client().constants())?;
    runner.run(cypher::count(&kind))?.scalar()
}

pub(crate) fn create_links<C: Cypher>(runner: &C, handler: WriteHandler<'_>) -> Result<Flow> {
    let null = runner.client().constants().null;
    let index = runner.client().fetch_next_id();
    runner.run(cypher::create(index, null, null))?;
    Ok(handler(Link::nothing(), Link::new(index, null, null)))
}

pub(crate) fn create_point<C: Cypher>(runner: &C) -> Result<LinkId> {
    let index = runner.client().fetch_next_id();
    runner.run(cypher::create(index, index, index))?;
    Ok(index)
}

pub(crate) fn each_links<C: Cypher>(
    runner: &C,
    query: &[LinkId],
    handler: ReadHandler<'_>,
) -> Result<Flow> {
    let kind = QueryKind::classify(query, runner.client().constants())?;
    let result = runner.run(cypher::select(&kind))?;
    for row in &result.data {
        if handler(row.link()?).is_break() {
            return Ok(Flow::Break);
        }
    }
    Ok(Flow::Continue)
}

pub(crate) fn get_link<C: Cypher>(runner: &C, index: LinkId) -> Result<Option<Link>> {
    let result = runner.run(cypher::get(index))?;
    match result.data.first() {
        Some(row) => Ok(Some(row.link()?)),
        None => Ok(None),
    }
}

pub(crate) fn update_links<C: Cypher>(
    runner: &C,
    query: &[LinkId],
    change: &[LinkId],
    handler: WriteHandler<'_>,
) -> Result<Flow> {
    let index = query_index(query)?;
    let (source, target) = change_ends(change)?;
    let before = get_link(runner, index)?.ok_or(LinksError::NotExists(index))?;
    runner.run(cypher::update(index, source, target))?;
    Ok(handler(before, Link::new(index, source, target)))
}

pub(crate) fn delete_links<C: Cypher>(
    runner: &C,
    query: &[LinkId],
    handler: WriteHandler<'_>,
) -> Result<Flow> {
    let index = query_index(query)?;
    let before = get_link(runner, index)?.ok_or(LinksError::NotExists(index))?;
    runner.run(cypher::delete(index))?;
    Ok(handler(before, Link::nothing()))
}
