use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, path::Path};

use crate::{
    links::{
        change_ends, query_index, Doublets, Flow, Link, LinkId, Links, LinksConstants, LinksError,
        QueryKind, ReadHandler, Result, WriteHandler,
    },
    mem::{FileMapped, RawMem, Volatile},
};

use super::{mem_len, visit, Slots};

/// The cell a united store keeps per link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPart {
    pub source: LinkId,
    pub target: LinkId,
    pub occupied: bool,
}

/// A doublets store keeping each link in a single cell.
///
/// Cell `i` of the memory holds link `i`; cell 0 is never used. Source and
/// target indexes are ordered sets of `(key, id)` rebuilt from the cells when
/// the store is opened.
#[derive(Debug)]
pub struct UnitedStore<M> {
    mem: M,
    constants: LinksConstants,
    slots: Slots,
    sources: BTreeSet<(LinkId, LinkId)>,
    targets: BTreeSet<(LinkId, LinkId)>,
}

impl UnitedStore<Volatile<LinkPart>> {
    /// Creates an empty in-memory store.
    pub fn volatile() -> Self {
        Self::empty(Volatile::new())
    }
}

impl UnitedStore<FileMapped<LinkPart>> {
    /// Opens (or creates) a store persisted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(FileMapped::open(path)?)
    }
}

impl<M: RawMem<LinkPart>> UnitedStore<M> {
    /// Builds a store over `mem`, recovering any links it already holds.
    pub fn new(mem: M) -> Result<Self> {
        let mut store = Self::empty(mem);
        let len = store.mem.len();
        let slots = Slots::rebuild((1..len).map(|i| store.cell(i as LinkId).is_some()));
        store.slots = slots;
        for index in 1..len as LinkId {
            if let Some(part) = store.cell(index) {
                store.sources.insert((part.source, index));
                store.targets.insert((part.target, index));
            }
        }
        tracing::debug!(links = store.slots.count(), "opened united store");
        Ok(store)
    }

    fn empty(mem: M) -> Self {
        Self {
            mem,
            constants: LinksConstants::new(),
            slots: Slots::default(),
            sources: BTreeSet::new(),
            targets: BTreeSet::new(),
        }
    }

    /// Pushes pending writes to the backing memory.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.mem.flush()?)
    }

    pub fn mem(&self) -> &M {
        &self.mem
    }

    #[inline]
    fn cell(&self, index: LinkId) -> Option<LinkPart> {
        if index == 0 {
            return None;
        }
        self.mem.get(index as usize).filter(|part| part.occupied).copied()
    }

    #[inline]
    fn link(&self, index: LinkId) -> Option<Link> {
        self.cell(index)
            .map(|part| Link::new(index, part.source, part.target))
    }

    fn by_key<'a>(
        &'a self,
        tree: &'a BTreeSet<(LinkId, LinkId)>,
        key: LinkId,
    ) -> impl Iterator<Item = Link> + 'a {
        tree.range((key, 0)..=(key, LinkId::MAX))
            .filter_map(move |&(_, index)| self.link(index))
    }
}

impl<M: RawMem<LinkPart>> Links for UnitedStore<M> {
    fn constants(&self) -> &LinksConstants {
        &self.constants
    }

    fn count_links(&self, query: &[LinkId]) -> Result<u64> {
        if QueryKind::classify(query, &self.constants)? == QueryKind::All {
            return Ok(self.slots.count());
        }
        let mut count = 0;
        self.each_links(query, &mut |_| {
            count += 1;
            Flow::Continue
        })?;
        Ok(count)
    }

    fn create_links(&mut self, _query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        let index = self.slots.acquire();
        let null = self.constants.null;
        self.mem.set(
            index as usize,
            LinkPart {
                source: null,
                target: null,
                occupied: true,
            },
        )?;
        self.sources.insert((null, index));
        self.targets.insert((null, index));
        Ok(handler(Link::nothing(), Link::new(index, null, null)))
    }

    fn each_links(&self, query: &[LinkId], handler: ReadHandler<'_>) -> Result<Flow> {
        let kind = QueryKind::classify(query, &self.constants)?;
        let flow = match kind {
            QueryKind::All => visit(
                (1..=self.slots.allocated()).filter_map(|index| self.link(index)),
                &kind,
                handler,
            ),
            QueryKind::Identity { index, .. } => visit(self.link(index).into_iter(), &kind, handler),
            QueryKind::Concrete { source, .. } | QueryKind::Outgoing(source) => {
                visit(self.by_key(&self.sources, source), &kind, handler)
            }
            QueryKind::Incoming(target) => visit(self.by_key(&self.targets, target), &kind, handler),
        };
        Ok(flow)
    }

    fn update_links(
        &mut self,
        query: &[LinkId],
        change: &[LinkId],
        handler: WriteHandler<'_>,
    ) -> Result<Flow> {
        let index = query_index(query)?;
        let (source, target) = change_ends(change)?;
        let before = self.link(index).ok_or(LinksError::NotExists(index))?;

        self.sources.remove(&(before.source, index));
        self.targets.remove(&(before.target, index));
        self.mem.set(
            index as usize,
            LinkPart {
                source,
                target,
                occupied: true,
            },
        )?;
        self.sources.insert((source, index));
        self.targets.insert((target, index));

        Ok(handler(before, Link::new(index, source, target)))
    }

    fn delete_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        let index = query_index(query)?;
        let before = self.link(index).ok_or(LinksError::NotExists(index))?;

        self.sources.remove(&(before.source, index));
        self.targets.remove(&(before.target, index));
        self.mem.set(index as usize, LinkPart::default())?;

        let mem = &self.mem;
        let shrunk = self.slots.release(index, |id| {
            mem.get(id as usize).map_or(false, |part| part.occupied)
        });
        if let Some(allocated) = shrunk {
            self.mem.truncate(mem_len(allocated))?;
        }

        Ok(handler(before, Link::nothing()))
    }
}

impl<M: RawMem<LinkPart>> Doublets for UnitedStore<M> {
    fn get_link(&self, index: LinkId) -> Result<Option<Link>> {
        Ok(self.link(index))
    }

    fn delete_all(&mut self) -> Result<()> {
        self.mem.clear()?;
        self.slots = Slots::default();
        self.sources.clear();
        self.targets.clear();
        Ok(())
    }
}
