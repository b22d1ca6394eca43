use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

use crate::{
    links::{
        change_ends, query_index, Doublets, Flow, Link, LinkId, Links, LinksConstants, LinksError,
        QueryKind, ReadHandler, Result, WriteHandler,
    },
    mem::{FileMapped, RawMem, Volatile},
};

use super::{mem_len, visit, Slots};

/// The data cell of a split store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPart {
    pub source: LinkId,
    pub target: LinkId,
}

/// The index cell of a split store.
///
/// Every link sits in two doubly-linked lists: one per distinct source and
/// one per distinct target. `0` terminates a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPart {
    pub occupied: bool,
    pub source_prev: LinkId,
    pub source_next: LinkId,
    pub target_prev: LinkId,
    pub target_next: LinkId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

impl IndexPart {
    fn prev(&self, side: Side) -> LinkId {
        match side {
            Side::Source => self.source_prev,
            Side::Target => self.target_prev,
        }
    }

    fn next(&self, side: Side) -> LinkId {
        match side {
            Side::Source => self.source_next,
            Side::Target => self.target_next,
        }
    }

    fn set_prev(&mut self, side: Side, value: LinkId) {
        match side {
            Side::Source => self.source_prev = value,
            Side::Target => self.target_prev = value,
        }
    }

    fn set_next(&mut self, side: Side, value: LinkId) {
        match side {
            Side::Source => self.source_next = value,
            Side::Target => self.target_next = value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ListHead {
    first: LinkId,
    len: u64,
}

/// A doublets store with link data and indexes in separate memories.
#[derive(Debug)]
pub struct SplitStore<D, I> {
    data: D,
    index: I,
    constants: LinksConstants,
    slots: Slots,
    sources: HashMap<LinkId, ListHead>,
    targets: HashMap<LinkId, ListHead>,
}

impl SplitStore<Volatile<DataPart>, Volatile<IndexPart>> {
    /// Creates an empty in-memory store.
    pub fn volatile() -> Self {
        Self::empty(Volatile::new(), Volatile::new())
    }
}

impl SplitStore<FileMapped<DataPart>, FileMapped<IndexPart>> {
    /// Opens (or creates) a store persisted in two files.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(data: P, index: Q) -> Result<Self> {
        Self::new(FileMapped::open(data)?, FileMapped::open(index)?)
    }
}

impl<D, I> SplitStore<D, I>
where
    D: RawMem<DataPart>,
    I: RawMem<IndexPart>,
{
    /// Builds a store over the given memories, recovering any links they hold.
    pub fn new(data: D, index: I) -> Result<Self> {
        let mut store = Self::empty(data, index);
        let len = store.index.len();
        let slots = Slots::rebuild((1..len).map(|i| store.index_part(i as LinkId).occupied));
        store.slots = slots;

        for id in 1..len as LinkId {
            let part = store.index_part(id);
            if !part.occupied {
                continue;
            }
            let data = store.data_part(id);
            for (side, key) in [(Side::Source, data.source), (Side::Target, data.target)] {
                let head = store.heads_mut(side).entry(key).or_default();
                head.len += 1;
                if part.prev(side) == 0 {
                    head.first = id;
                }
            }
        }
        tracing::debug!(links = store.slots.count(), "opened split store");
        Ok(store)
    }

    fn empty(data: D, index: I) -> Self {
        Self {
            data,
            index,
            constants: LinksConstants::new(),
            slots: Slots::default(),
            sources: HashMap::new(),
            targets: HashMap::new(),
        }
    }

    /// Pushes pending writes of both memories.
    pub fn flush(&mut self) -> Result<()> {
        self.data.flush()?;
        self.index.flush()?;
        Ok(())
    }

    pub fn data_mem(&self) -> &D {
        &self.data
    }

    pub fn index_mem(&self) -> &I {
        &self.index
    }

    #[inline]
    fn index_part(&self, id: LinkId) -> IndexPart {
        self.index.get(id as usize).copied().unwrap_or_default()
    }

    #[inline]
    fn data_part(&self, id: LinkId) -> DataPart {
        self.data.get(id as usize).copied().unwrap_or_default()
    }

    #[inline]
    fn link(&self, id: LinkId) -> Option<Link> {
        if id == 0 || !self.index_part(id).occupied {
            return None;
        }
        let data = self.data_part(id);
        Some(Link::new(id, data.source, data.target))
    }

    fn heads(&self, side: Side) -> &HashMap<LinkId, ListHead> {
        match side {
            Side::Source => &self.sources,
            Side::Target => &self.targets,
        }
    }

    fn heads_mut(&mut self, side: Side) -> &mut HashMap<LinkId, ListHead> {
        match side {
            Side::Source => &mut self.sources,
            Side::Target => &mut self.targets,
        }
    }

    fn list_len(&self, side: Side, key: LinkId) -> u64 {
        self.heads(side).get(&key).map_or(0, |head| head.len)
    }

    /// Pushes `id` at the front of the `key` list.
    fn attach(&mut self, side: Side, key: LinkId, id: LinkId) -> Result<()> {
        let head = self.heads(side).get(&key).copied().unwrap_or_default();

        let mut part = self.index_part(id);
        part.set_prev(side, 0);
        part.set_next(side, head.first);
        self.index.set(id as usize, part)?;

        if head.first != 0 {
            let mut first = self.index_part(head.first);
            first.set_prev(side, id);
            self.index.set(head.first as usize, first)?;
        }

        self.heads_mut(side).insert(
            key,
            ListHead {
                first: id,
                len: head.len + 1,
            },
        );
        Ok(())
    }

    /// Unlinks `id` from the `key` list.
    fn detach(&mut self, side: Side, key: LinkId, id: LinkId) -> Result<()> {
        let mut part = self.index_part(id);
        let (prev, next) = (part.prev(side), part.next(side));

        if prev != 0 {
            let mut before = self.index_part(prev);
            before.set_next(side, next);
            self.index.set(prev as usize, before)?;
        }
        if next != 0 {
            let mut after = self.index_part(next);
            after.set_prev(side, prev);
            self.index.set(next as usize, after)?;
        }

        let heads = self.heads_mut(side);
        if let Some(head) = heads.get_mut(&key) {
            head.len -= 1;
            if prev == 0 {
                head.first = next;
            }
            if head.len == 0 {
                heads.remove(&key);
            }
        }

        part.set_prev(side, 0);
        part.set_next(side, 0);
        self.index.set(id as usize, part)?;
        Ok(())
    }

    fn walk(&self, side: Side, key: LinkId) -> ListIter<'_, D, I> {
        ListIter {
            store: self,
            side,
            current: self.heads(side).get(&key).map_or(0, |head| head.first),
        }
    }
}

struct ListIter<'a, D, I> {
    store: &'a SplitStore<D, I>,
    side: Side,
    current: LinkId,
}

impl<D, I> Iterator for ListIter<'_, D, I>
where
    D: RawMem<DataPart>,
    I: RawMem<IndexPart>,
{
    type Item = Link;

    fn next(&mut self) -> Option<Link> {
        if self.current == 0 {
            return None;
        }
        let id = self.current;
        self.current = self.store.index_part(id).next(self.side);
        self.store.link(id)
    }
}

impl<D, I> Links for SplitStore<D, I>
where
    D: RawMem<DataPart>,
    I: RawMem<IndexPart>,
{
    fn constants(&self) -> &LinksConstants {
        &self.constants
    }

    fn count_links(&self, query: &[LinkId]) -> Result<u64> {
        match QueryKind::classify(query, &self.constants)? {
            QueryKind::All => Ok(self.slots.count()),
            QueryKind::Outgoing(source) => Ok(self.list_len(Side::Source, source)),
            QueryKind::Incoming(target) => Ok(self.list_len(Side::Target, target)),
            _ => {
                let mut count = 0;
                self.each_links(query, &mut |_| {
                    count += 1;
                    Flow::Continue
                })?;
                Ok(count)
            }
        }
    }

    fn create_links(&mut self, _query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        let id = self.slots.acquire();
        let null = self.constants.null;
        self.data.set(
            id as usize,
            DataPart {
                source: null,
                target: null,
            },
        )?;
        self.index.set(
            id as usize,
            IndexPart {
                occupied: true,
                ..IndexPart::default()
            },
        )?;
        self.attach(Side::Source, null, id)?;
        self.attach(Side::Target, null, id)?;
        Ok(handler(Link::nothing(), Link::new(id, null, null)))
    }

    fn each_links(&self, query: &[LinkId], handler: ReadHandler<'_>) -> Result<Flow> {
        let kind = QueryKind::classify(query, &self.constants)?;
        let flow = match kind {
            QueryKind::All => visit(
                (1..=self.slots.allocated()).filter_map(|id| self.link(id)),
                &kind,
                handler,
            ),
            QueryKind::Identity { index, .. } => visit(self.link(index).into_iter(), &kind, handler),
            QueryKind::Concrete { source, target } => {
                if self.list_len(Side::Source, source) <= self.list_len(Side::Target, target) {
                    visit(self.walk(Side::Source, source), &kind, handler)
                } else {
                    visit(self.walk(Side::Target, target), &kind, handler)
                }
            }
            QueryKind::Outgoing(source) => visit(self.walk(Side::Source, source), &kind, handler),
            QueryKind::Incoming(target) => visit(self.walk(Side::Target, target), &kind, handler),
        };
        Ok(flow)
    }

    fn update_links(
        &mut self,
        query: &[LinkId],
        change: &[LinkId],
        handler: WriteHandler<'_>,
    ) -> Result<Flow> {
        let id = query_index(query)?;
        let (source, target) = change_ends(change)?;
        let before = self.link(id).ok_or(LinksError::NotExists(id))?;

        if before.source != source {
            self.detach(Side::Source, before.source, id)?;
        }
        if before.target != target {
            self.detach(Side::Target, before.target, id)?;
        }
        self.data.set(id as usize, DataPart { source, target })?;
        if before.source != source {
            self.attach(Side::Source, source, id)?;
        }
        if before.target != target {
            self.attach(Side::Target, target, id)?;
        }

        Ok(handler(before, Link::new(id, source, target)))
    }

    fn delete_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        let id = query_index(query)?;
        let before = self.link(id).ok_or(LinksError::NotExists(id))?;

        self.detach(Side::Source, before.source, id)?;
        self.detach(Side::Target, before.target, id)?;
        self.index.set(id as usize, IndexPart::default())?;
        self.data.set(id as usize, DataPart::default())?;

        let index = &self.index;
        let shrunk = self.slots.release(id, |id| {
            index.get(id as usize).map_or(false, |part| part.occupied)
        });
        if let Some(allocated) = shrunk {
            self.index.truncate(mem_len(allocated))?;
            self.data.truncate(mem_len(allocated))?;
        }

        Ok(handler(before, Link::nothing()))
    }
}

impl<D, I> Doublets for SplitStore<D, I>
where
    D: RawMem<DataPart>,
    I: RawMem<IndexPart>,
{
    fn get_link(&self, index: LinkId) -> Result<Option<Link>> {
        Ok(self.link(index))
    }

    fn delete_all(&mut self) -> Result<()> {
        self.data.clear()?;
        self.index.clear()?;
        self.slots = Slots::default();
        self.sources.clear();
        self.targets.clear();
        Ok(())
    }
}
