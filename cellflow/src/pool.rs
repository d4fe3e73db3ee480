use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::key::KeyMap;
use crate::{Cell, CellId, ItemKey};

/// Arena of cells plus the index → cell table and the free list.
///
/// `CellId`s are arena slots and are never reused for a different cell.
#[derive(Clone, Debug)]
pub(crate) struct CellPool<K, V> {
    cells: Vec<Cell<K, V>>,
    bound: BTreeMap<usize, CellId>,
    free: Vec<CellId>,
}

impl<K: ItemKey, V> CellPool<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            cells: Vec::new(),
            bound: BTreeMap::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell<K, V>> {
        self.cells.get(id.slot())
    }

    pub(crate) fn at(&self, index: usize) -> Option<CellId> {
        self.bound.get(&index).copied()
    }

    pub(crate) fn bound_len(&self) -> usize {
        self.bound.len()
    }

    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn allocated_len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn bound_span(&self) -> Option<(usize, usize)> {
        let first = *self.bound.keys().next()?;
        let last = *self.bound.keys().next_back()?;
        Some((first, last + 1))
    }

    pub(crate) fn iter_bound(&self) -> impl Iterator<Item = &Cell<K, V>> + '_ {
        self.bound.values().map(|id| &self.cells[id.slot()])
    }

    pub(crate) fn for_each_bound_mut(&mut self, mut f: impl FnMut(usize, &mut Cell<K, V>)) {
        let cells = &mut self.cells;
        for (&index, id) in self.bound.iter() {
            f(index, &mut cells[id.slot()]);
        }
    }

    pub(crate) fn allocate(&mut self) -> CellId {
        debug_assert!(self.cells.len() < u32::MAX as usize, "cell arena overflow");
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Cell::new(id));
        id
    }

    pub(crate) fn take_free(&mut self) -> Option<CellId> {
        self.free.pop()
    }

    /// Removes from the free list every cell whose last key matches one of `wanted`.
    ///
    /// Returns one slot per wanted entry, in order. Each free cell is claimed at most once.
    pub(crate) fn claim_by_key(&mut self, wanted: &[(usize, K)]) -> Vec<Option<CellId>> {
        if wanted.is_empty() || self.free.is_empty() {
            return vec![None; wanted.len()];
        }

        let mut by_key: KeyMap<K, CellId> = KeyMap::new();
        for &id in &self.free {
            if let Some(key) = self.cells[id.slot()].key() {
                by_key.entry(key.clone()).or_insert(id);
            }
        }

        let claimed: Vec<Option<CellId>> = wanted
            .iter()
            .map(|(_, key)| by_key.remove(key))
            .collect();

        if claimed.iter().any(Option::is_some) {
            self.free.retain(|id| !claimed.contains(&Some(*id)));
        }
        claimed
    }

    /// Binds `id` (which must not be bound) to `index`.
    pub(crate) fn bind(&mut self, id: CellId, index: usize, key: K, content: V, revision: u64) {
        let prev = self.bound.insert(index, id);
        assert!(
            prev.is_none(),
            "cell pool: index {index} bound twice ({prev:?} and {id:?})"
        );
        self.cells[id.slot()].bind(index, key, content, revision);
    }

    pub(crate) fn release_all(&mut self) -> usize {
        self.remap(|_| None)
    }

    /// Releases every bound cell whose index fails `keep`.
    pub(crate) fn retain_bound(&mut self, mut keep: impl FnMut(usize) -> bool) -> usize {
        self.remap(|index| keep(index).then_some(index))
    }

    /// Moves every bound cell to `f(index)`, or releases it when `f` returns `None`.
    ///
    /// Returns the number of released cells. `f` must be injective over the bound indexes.
    pub(crate) fn remap(&mut self, mut f: impl FnMut(usize) -> Option<usize>) -> usize {
        let old = core::mem::take(&mut self.bound);
        let mut released = 0usize;
        for (index, id) in old {
            match f(index) {
                Some(next) => {
                    let prev = self.bound.insert(next, id);
                    assert!(
                        prev.is_none(),
                        "cell pool: remap sent two cells to index {next}"
                    );
                    self.cells[id.slot()].set_index(Some(next));
                }
                None => {
                    self.cells[id.slot()].set_index(None);
                    self.free.push(id);
                    released += 1;
                }
            }
        }
        released
    }

    /// Panics if the pool is inconsistent.
    ///
    /// Checked: no index bound twice, no cell both bound and free, no orphaned cell, every cell's
    /// own index agrees with the table, and every bound index is `< count`.
    pub(crate) fn assert_consistent(&self, count: usize) {
        let mut seen = vec![false; self.cells.len()];

        for (&index, &id) in &self.bound {
            assert!(
                index < count,
                "cell pool: {id:?} bound to index {index} beyond {count} items"
            );
            let slot = id.slot();
            assert!(slot < self.cells.len(), "cell pool: dangling {id:?}");
            assert!(!seen[slot], "cell pool: {id:?} bound to two indexes");
            seen[slot] = true;
            assert_eq!(
                self.cells[slot].index(),
                Some(index),
                "cell pool: {id:?} disagrees with the index table"
            );
        }

        for &id in &self.free {
            let slot = id.slot();
            assert!(slot < self.cells.len(), "cell pool: dangling {id:?}");
            assert!(!seen[slot], "cell pool: {id:?} is both bound and free");
            seen[slot] = true;
            assert_eq!(
                self.cells[slot].index(),
                None,
                "cell pool: free {id:?} still claims an index"
            );
        }

        if let Some(orphan) = seen.iter().position(|s| !s) {
            panic!("cell pool: cell {orphan} is neither bound nor free");
        }
    }
}

impl<K, V> CellPool<K, V> {
    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell<K, V>> {
        self.cells.get_mut(id.slot())
    }
}
