use alloc::vec::Vec;

/// Stable identity of a pooled cell.
///
/// A `CellId` never changes while the cell is rebound to other indexes or items, so adapters can
/// key their real UI objects (widgets, DOM nodes, GPU buffers) by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId(pub(crate) u32);

impl CellId {
    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Whether a cell's content reflects its bound item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingState {
    /// Content was rendered from the item and has not been invalidated since.
    #[default]
    Current,
    /// Content is a cached rendering that must be rebound on the next pulse.
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovePolicy {
    /// A moved item keeps its cell; the cell is re-indexed without rebinding.
    PreserveIdentity,
    /// A moved item is treated as remove + insert: its cell goes back to the pool and the
    /// target index is bound on the next pulse.
    RemoveInsert,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl IndexRange {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    pub fn iter(&self) -> core::ops::Range<usize> {
        self.start_index..self.end_index.max(self.start_index)
    }
}

impl From<core::ops::Range<usize>> for IndexRange {
    fn from(r: core::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// A structural change to the backing sequence, reported after it happened.
///
/// Indexes refer to the sequence *before* the change, except for `Moved::to` which is the final
/// position of the moved item and `Inserted::index` which is the position of the first new item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Change {
    Inserted {
        index: usize,
        count: usize,
    },
    Removed {
        index: usize,
        count: usize,
    },
    Moved {
        from: usize,
        to: usize,
    },
    /// Items in `start..start + new_indexes.len()` were reordered in place.
    ///
    /// `new_indexes[i]` is the new index of the item previously at `start + i`.
    Permuted {
        start: usize,
        new_indexes: Vec<usize>,
    },
    /// Items in `index..index + count` were replaced in place.
    Updated {
        index: usize,
        count: usize,
    },
    /// The whole sequence was replaced; nothing about old indexes can be assumed.
    Reset,
}

/// Summary of one rendering pulse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PulseReport {
    /// Sequence number of this pulse, starting at 1.
    pub pulse: u64,
    /// Whether the viewport window was re-materialized.
    pub laid_out: bool,
    /// The materialized index range after the pulse.
    pub window: IndexRange,
    /// Cells newly allocated.
    pub created: usize,
    /// Pooled cells bound to a new index.
    pub reused: usize,
    /// Cells returned to the pool.
    pub released: usize,
    /// Stale cells whose content was re-read from their (unchanged) item.
    pub rebound: usize,
    /// Current cells whose reactive fields were updated in place.
    pub updated: usize,
}
