//! Native doublets stores.
//!
//! Two layouts are provided, each generic over the [`RawMem`](crate::mem::RawMem)
//! it keeps its cells in:
//!
//! - [`UnitedStore`] keeps a link's source, target and occupancy in one cell
//!   and indexes sources and targets with ordered trees.
//! - [`SplitStore`] keeps link data and index data in two separate memories;
//!   its indexes are doubly-linked lists threaded through the index cells.
//!
//! Both allocate ids densely starting at 1 and reuse freed ids.

pub mod split;
pub mod united;


pub use self::{
    split::{DataPart, IndexPart, SplitStore},
    united::{LinkPart, UnitedStore},
};

use crate::{
    links::{Flow, Link, LinkId, QueryKind, ReadHandler},
    mem::{FileMapped, Volatile},
};

pub type UnitedVolatile = UnitedStore<Volatile<LinkPart>>;
pub type UnitedNonVolatile = UnitedStore<FileMapped<LinkPart>>;
pub type SplitVolatile = SplitStore<Volatile<DataPart>, Volatile<IndexPart>>;
pub type SplitNonVolatile = SplitStore<FileMapped<DataPart>, FileMapped<IndexPart>>;

/// Id allocation shared by both layouts.
#[derive(Debug, Default, Clone)]
pub(crate) struct Slots {
    /// Highest id handed out and still in use.
    allocated: LinkId,
    /// Ids below `allocated` that were freed, reused last-in first-out.
    free: Vec<LinkId>,
    /// Number of live links.
    count: u64,
}

impl Slots {
    /// Rebuilds allocation state from per-id occupancy, `occupied[0]` being id 1.
    pub(crate) fn rebuild(occupied: impl IntoIterator<Item = bool>) -> Self {
        let mut slots = Slots::default();
        let mut vacant = Vec::new();
        for (offset, used) in occupied.into_iter().enumerate() {
            let id = offset as LinkId + 1;
            if used {
                slots.allocated = id;
                slots.count += 1;
            } else {
                vacant.push(id);
            }
        }
        let allocated = slots.allocated;
        slots.free = vacant.into_iter().filter(|&id| id < allocated).collect();
        slots
    }

    pub(crate) fn allocated(&self) -> LinkId {
        self.allocated
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// Hands out the next id.
    pub(crate) fn acquire(&mut self) -> LinkId {
        self.count += 1;
        match self.free.pop() {
            Some(id) => id,
            None => {
                self.allocated += 1;
                self.allocated
            }
        }
    }

    /// Returns `id` to the pool. `occupied` must already report `id` as free.
    ///
    /// Returns the new `allocated` value when the allocation shrank.
    pub(crate) fn release(
        &mut self,
        id: LinkId,
        occupied: impl Fn(LinkId) -> bool,
    ) -> Option<LinkId> {
        self.count -= 1;
        if id != self.allocated {
            self.free.push(id);
            return None;
        }
        self.allocated -= 1;
        while self.allocated > 0 && !occupied(self.allocated) {
            self.allocated -= 1;
        }
        let allocated = self.allocated;
        self.free.retain(|&free| free < allocated);
        Some(allocated)
    }
}

/// Memory length needed to hold ids up to `allocated`, slot 0 included.
pub(crate) fn mem_len(allocated: LinkId) -> usize {
    if allocated == 0 {
        0
    } else {
        allocated as usize + 1
    }
}

/// Feeds the links satisfying `kind` to `handler`.
pub(crate) fn visit(
    links: impl Iterator<Item = Link>,
    kind: &QueryKind,
    handler: ReadHandler<'_>,
) -> Flow {
    for link in links {
        if kind.matches(&link) && handler(link).is_break() {
            return Flow::Break;
        }
    }
    Flow::Continue
}
