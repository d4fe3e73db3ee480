use crate::ItemKey;

/// Read access to the backing sequence.
///
/// The reconciler never mutates the sequence. It reads keys to track item identity, renders
/// content snapshots when binding a cell, and compares revisions to detect reactive changes.
pub trait ItemSource {
    type Key: ItemKey;
    type Content;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable identity of the item at `index`.
    fn key(&self, index: usize) -> Self::Key;

    /// Snapshot of the item's displayed content.
    fn render(&self, index: usize) -> Self::Content;

    /// Revision of the item's reactive fields.
    ///
    /// Any change to a field that should propagate without `refresh()` must move this value.
    /// Sources without reactive fields keep the default.
    fn revision(&self, _index: usize) -> u64 {
        0
    }

    /// Brings a current cell's content up to date after `revision(index)` moved.
    ///
    /// Only the reactive parts of `content` may change here; plain fields stay as bound until a
    /// refresh. The default re-renders, which is right when all displayed fields are reactive.
    fn update(&self, index: usize, content: &mut Self::Content) {
        *content = self.render(index);
    }
}

/// Plain slices act as sources whose items are their own keys and content.
impl<T: ItemKey> ItemSource for [T] {
    type Key = T;
    type Content = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn key(&self, index: usize) -> T {
        self[index].clone()
    }

    fn render(&self, index: usize) -> T {
        self[index].clone()
    }
}
