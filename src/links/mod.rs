//! The links data model and the traits every backend implements.
//!
//! A link (doublet) is an `(index, source, target)` triple. Backends expose a
//! small set of primitive operations through [`Links`], and the convenience
//! API used by the benchmarks is layered on top of them by [`Doublets`].
//!
//! Queries are slices of link ids in one of three shapes:
//!
//! | Query             | Meaning                               |
//! |-------------------|---------------------------------------|
//! | `[]`              | every link                            |
//! | `[index]`         | the link with that index              |
//! | `[index, s, t]`   | links matching each non-`any` element |

pub mod links_error;


use serde::{Deserialize, Serialize};

pub use self::links_error::LinksError;

/// Identifier of a link. `0` is never a valid link.
pub type LinkId = u64;

/// Result alias used by every backend.
pub type Result<T, E = LinksError> = std::result::Result<T, E>;

/// Handler called for every link visited by a read.
pub type ReadHandler<'a> = &'a mut dyn FnMut(Link) -> Flow;

/// Handler called with the `(before, after)` state of a written link.
pub type WriteHandler<'a> = &'a mut dyn FnMut(Link, Link) -> Flow;

/// A single doublet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub index: LinkId,
    pub source: LinkId,
    pub target: LinkId,
}

impl Link {
    pub const fn new(index: LinkId, source: LinkId, target: LinkId) -> Self {
        Self {
            index,
            source,
            target,
        }
    }

    /// The all-zero link handed to write handlers for the missing side of a
    /// create or delete.
    pub const fn nothing() -> Self {
        Self::new(0, 0, 0)
    }

    /// A link pointing to itself on both ends.
    pub const fn point(index: LinkId) -> Self {
        Self::new(index, index, index)
    }

    pub fn is_null(&self) -> bool {
        self.index == 0 && self.source == 0 && self.target == 0
    }

    pub fn is_point(&self) -> bool {
        self.index == self.source && self.index == self.target
    }
}

/// Whether an iteration should go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

impl Flow {
    pub fn is_break(self) -> bool {
        self == Flow::Break
    }
}

/// Special values understood by every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinksConstants {
    /// The "no link" value written into fresh links.
    pub null: LinkId,
    /// The wildcard used in queries.
    pub any: LinkId,
}

impl LinksConstants {
    pub const fn new() -> Self {
        Self { null: 0, any: 0 }
    }
}

impl Default for LinksConstants {
    fn default() -> Self {
        Self::new()
    }
}

/// The shape of a query, after wildcards have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// `[*, *, *]`
    All,
    /// `[index, ?, ?]`, optionally filtered by source and target.
    Identity {
        index: LinkId,
        source: Option<LinkId>,
        target: Option<LinkId>,
    },
    /// `[*, source, target]`
    Concrete { source: LinkId, target: LinkId },
    /// `[*, source, *]`
    Outgoing(LinkId),
    /// `[*, *, target]`
    Incoming(LinkId),
}

impl QueryKind {
    /// Classifies a raw query slice.
    pub fn classify(query: &[LinkId], constants: &LinksConstants) -> Result<Self> {
        let any = constants.any;
        let given = |value: LinkId| (value != any).then_some(value);
        match *query {
            [] => Ok(QueryKind::All),
            [index] => Ok(match given(index) {
                Some(index) => QueryKind::Identity {
                    index,
                    source: None,
                    target: None,
                },
                None => QueryKind::All,
            }),
            [index, source, target] => Ok(match (given(index), given(source), given(target)) {
                (Some(index), source, target) => QueryKind::Identity {
                    index,
                    source,
                    target,
                },
                (None, Some(source), Some(target)) => QueryKind::Concrete { source, target },
                (None, Some(source), None) => QueryKind::Outgoing(source),
                (None, None, Some(target)) => QueryKind::Incoming(target),
                (None, None, None) => QueryKind::All,
            }),
            _ => Err(LinksError::InvalidQuery(query.len())),
        }
    }

    /// Whether `link` satisfies this query.
    pub fn matches(&self, link: &Link) -> bool {
        match *self {
            QueryKind::All => true,
            QueryKind::Identity {
                index,
                source,
                target,
            } => {
                link.index == index
                    && source.map_or(true, |s| link.source == s)
                    && target.map_or(true, |t| link.target == t)
            }
            QueryKind::Concrete { source, target } => {
                link.source == source && link.target == target
            }
            QueryKind::Outgoing(source) => link.source == source,
            QueryKind::Incoming(target) => link.target == target,
        }
    }
}

/// Extracts the link index addressed by an update or delete query.
pub(crate) fn query_index(query: &[LinkId]) -> Result<LinkId> {
    match query {
        [index] | [index, _, _] => Ok(*index),
        _ => Err(LinksError::InvalidQuery(query.len())),
    }
}

/// Extracts `(source, target)` from an update change.
pub(crate) fn change_ends(change: &[LinkId]) -> Result<(LinkId, LinkId)> {
    match *change {
        [_, source, target] => Ok((source, target)),
        _ => Err(LinksError::InvalidChange(change.len())),
    }
}

/// Primitive operations of a links backend.
pub trait Links {
    fn constants(&self) -> &LinksConstants;

    /// Counts the links matching `query`.
    fn count_links(&self, query: &[LinkId]) -> Result<u64>;

    /// Creates a link `(new, null, null)`.
    fn create_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow>;

    /// Visits the links matching `query` until the handler breaks.
    fn each_links(&self, query: &[LinkId], handler: ReadHandler<'_>) -> Result<Flow>;

    /// Sets the source and target of the link addressed by `query` to
    /// `change[1]` and `change[2]`.
    fn update_links(
        &mut self,
        query: &[LinkId],
        change: &[LinkId],
        handler: WriteHandler<'_>,
    ) -> Result<Flow>;

    /// Removes the link addressed by `query`.
    fn delete_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow>;
}

/// The doublets API built on top of [`Links`].
pub trait Doublets: Links {
    fn get_link(&self, index: LinkId) -> Result<Option<Link>>;

    /// Creates a link with null ends and returns its index.
    fn create(&mut self) -> Result<LinkId> {
        let mut index = 0;
        self.create_links(&[], &mut |_, after| {
            index = after.index;
            Flow::Continue
        })?;
        Ok(index)
    }

    /// Creates a link whose source and target are the link itself.
    fn create_point(&mut self) -> Result<LinkId> {
        let index = self.create()?;
        self.update(index, index, index)
    }

    fn update(&mut self, index: LinkId, source: LinkId, target: LinkId) -> Result<LinkId> {
        let mut result = index;
        self.update_links(&[index], &[index, source, target], &mut |_, after| {
            result = after.index;
            Flow::Continue
        })?;
        Ok(result)
    }

    fn delete(&mut self, index: LinkId) -> Result<LinkId> {
        let mut result = index;
        self.delete_links(&[index], &mut |before, _| {
            result = before.index;
            Flow::Continue
        })?;
        Ok(result)
    }

    fn each(&self, mut handler: impl FnMut(Link) -> Flow) -> Result<Flow>
    where
        Self: Sized,
    {
        self.each_links(&[], &mut handler)
    }

    fn each_by(&self, query: impl AsRef<[LinkId]>, mut handler: impl FnMut(Link) -> Flow) -> Result<Flow>
    where
        Self: Sized,
    {
        self.each_links(query.as_ref(), &mut handler)
    }

    fn count(&self) -> Result<u64> {
        self.count_links(&[])
    }

    fn count_by(&self, query: impl AsRef<[LinkId]>) -> Result<u64>
    where
        Self: Sized,
    {
        self.count_links(query.as_ref())
    }

    fn exists(&self, index: LinkId) -> Result<bool> {
        Ok(self.get_link(index)?.is_some())
    }

    /// Finds the first link with the given ends.
    fn search(&self, source: LinkId, target: LinkId) -> Result<Option<LinkId>> {
        let any = self.constants().any;
        let mut found = None;
        self.each_links(&[any, source, target], &mut |link| {
            found = Some(link.index);
            Flow::Break
        })?;
        Ok(found)
    }

    /// Removes every link, highest index first.
    fn delete_all(&mut self) -> Result<()> {
        let mut indices = Vec::new();
        self.each_links(&[], &mut |link| {
            indices.push(link.index);
            Flow::Continue
        })?;
        indices.sort_unstable();
        for index in indices.into_iter().rev() {
            self.delete(index)?;
        }
        Ok(())
    }
}
