use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::sync::atomic::{self, AtomicU64};

use cellflow::{Change, FlowError};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an entry in a backing list or tree.
///
/// Ids are process-unique and never reused, so a pooled cell can never be mistaken for the
/// cell of a different item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// An item together with its identity.
#[derive(Debug)]
pub struct Entry<T> {
    id: ItemId,
    item: Rc<T>,
}

impl<T> Entry<T> {
    pub(crate) fn new(id: ItemId, item: Rc<T>) -> Self {
        Self { id, item }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn item(&self) -> &Rc<T> {
        &self.item
    }
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            item: Rc::clone(&self.item),
        }
    }
}

/// A backing list whose mutators report the [`Change`] they made.
#[derive(Debug)]
pub struct ItemList<T> {
    entries: Vec<Entry<T>>,
}

impl<T> ItemList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a list from shared items, so the same objects can back several controls.
    pub fn from_shared(items: impl IntoIterator<Item = Rc<T>>) -> Self {
        Self {
            entries: items
                .into_iter()
                .map(|item| Entry::new(ItemId::next(), item))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rc<T>> {
        self.entries.get(index).map(Entry::item)
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> + '_ {
        self.entries.iter().map(Entry::item)
    }

    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn push(&mut self, item: impl Into<Rc<T>>) -> Change {
        let index = self.entries.len();
        self.entries.push(Entry::new(ItemId::next(), item.into()));
        Change::Inserted { index, count: 1 }
    }

    pub fn insert(&mut self, index: usize, item: impl Into<Rc<T>>) -> Result<Change, FlowError> {
        if index > self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        self.entries
            .insert(index, Entry::new(ItemId::next(), item.into()));
        Ok(Change::Inserted { index, count: 1 })
    }

    pub fn remove(&mut self, index: usize) -> Result<(Rc<T>, Change), FlowError> {
        if index >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        let entry = self.entries.remove(index);
        Ok((entry.item, Change::Removed { index, count: 1 }))
    }

    /// Moves the item at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<Change, FlowError> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(self.out_of_bounds(from.max(to)));
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(Change::Moved { from, to })
    }

    /// Replaces the item at `index` with a new item (and a new identity).
    pub fn set(
        &mut self,
        index: usize,
        item: impl Into<Rc<T>>,
    ) -> Result<(Rc<T>, Change), FlowError> {
        if index >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        let old = core::mem::replace(
            &mut self.entries[index],
            Entry::new(ItemId::next(), item.into()),
        );
        Ok((old.item, Change::Updated { index, count: 1 }))
    }

    /// Stable-sorts the list. Items keep their identity.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Change {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| compare(&self.entries[a].item, &self.entries[b].item));

        let mut new_indexes = alloc::vec![0usize; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_indexes[old] = new;
        }

        let sorted = order.iter().map(|&old| self.entries[old].clone()).collect();
        self.entries = sorted;
        Change::Permuted {
            start: 0,
            new_indexes,
        }
    }

    pub fn clear(&mut self) -> Change {
        let count = self.entries.len();
        self.entries.clear();
        Change::Removed { index: 0, count }
    }

    /// Replaces every item. Items that should keep their cells must be passed back as the same
    /// `Entry` (see [`ItemList::entries`]).
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = Entry<T>>) -> Change {
        self.entries = entries.into_iter().collect();
        Change::Reset
    }

    fn out_of_bounds(&self, index: usize) -> FlowError {
        FlowError::IndexOutOfBounds {
            index,
            count: self.entries.len(),
        }
    }
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ItemList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|item| Entry::new(ItemId::next(), Rc::new(item)))
                .collect(),
        }
    }
}
