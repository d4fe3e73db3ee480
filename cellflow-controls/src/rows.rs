use cellflow::ItemSource;

use crate::{Entry, ItemId, Renderer};

/// Borrowed view of a control's rows as an [`ItemSource`].
pub(crate) struct Rows<'a, T, R> {
    pub(crate) entries: &'a [Entry<T>],
    pub(crate) renderer: &'a R,
}

impl<T, R: Renderer<T>> ItemSource for Rows<'_, T, R> {
    type Key = ItemId;
    type Content = R::Content;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn key(&self, index: usize) -> ItemId {
        self.entries[index].id()
    }

    fn render(&self, index: usize) -> R::Content {
        self.renderer.render(self.entries[index].item())
    }

    fn revision(&self, index: usize) -> u64 {
        self.renderer.revision(self.entries[index].item())
    }

    fn update(&self, index: usize, content: &mut R::Content) {
        self.renderer.update(self.entries[index].item(), content);
    }
}
