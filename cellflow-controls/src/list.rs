use alloc::rc::Rc;
use core::cmp::Ordering;

use cellflow::{Align, Cell, CellFlow, Change, FlowError, FlowOptions, PulseReport};

use crate::rows::Rows;
use crate::{Columns, Entry, ItemId, ItemList, Renderer, RowContent, TextRenderer};

/// A virtualized list: one cell per visible item.
///
/// Owns the backing [`ItemList`], the renderer and the [`CellFlow`]. Every mutation goes through
/// the list so the flow is notified of the exact change.
pub struct ListView<T, R: Renderer<T> = TextRenderer<T>> {
    items: ItemList<T>,
    renderer: R,
    flow: CellFlow<ItemId, R::Content>,
}

/// A virtualized table: one row cell per visible item, one text per column.
pub type TableView<T> = ListView<T, Columns<T>>;

impl<T, R: Renderer<T>> ListView<T, R> {
    /// Creates the control. `options.count` is overwritten with the number of items.
    pub fn new(items: ItemList<T>, renderer: R, options: FlowOptions) -> Self {
        let flow = CellFlow::new(options.with_count(items.len()));
        Self {
            items,
            renderer,
            flow,
        }
    }

    pub fn items(&self) -> &ItemList<T> {
        &self.items
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Read-only access to the reconciler (cells, window, pending state).
    pub fn flow(&self) -> &CellFlow<ItemId, R::Content> {
        &self.flow
    }

    pub fn push(&mut self, item: impl Into<Rc<T>>) -> Result<(), FlowError> {
        let change = self.items.push(item);
        self.notify(&change)
    }

    pub fn insert(&mut self, index: usize, item: impl Into<Rc<T>>) -> Result<(), FlowError> {
        let change = self.items.insert(index, item)?;
        self.notify(&change)
    }

    pub fn remove(&mut self, index: usize) -> Result<Rc<T>, FlowError> {
        let (item, change) = self.items.remove(index)?;
        self.notify(&change)?;
        Ok(item)
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), FlowError> {
        let change = self.items.move_item(from, to)?;
        self.notify(&change)
    }

    pub fn set(&mut self, index: usize, item: impl Into<Rc<T>>) -> Result<Rc<T>, FlowError> {
        let (old, change) = self.items.set(index, item)?;
        self.notify(&change)?;
        Ok(old)
    }

    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<(), FlowError> {
        let change = self.items.sort_by(compare);
        self.notify(&change)
    }

    pub fn clear(&mut self) -> Result<(), FlowError> {
        let change = self.items.clear();
        self.notify(&change)
    }

    pub fn replace_all(
        &mut self,
        entries: impl IntoIterator<Item = Entry<T>>,
    ) -> Result<(), FlowError> {
        let change = self.items.replace_all(entries);
        self.notify(&change)
    }

    /// Asks every visible cell to re-read its item on the next pulse.
    ///
    /// Needed after changing item fields that are not reactive.
    pub fn refresh(&mut self) {
        self.flow.refresh();
    }

    pub fn pulse(&mut self) -> Result<PulseReport, FlowError> {
        let rows = Rows {
            entries: self.items.entries(),
            renderer: &self.renderer,
        };
        self.flow.pulse(&rows)
    }

    pub fn resize(&mut self, viewport_size: u32) {
        self.flow.set_viewport_size(viewport_size);
    }

    /// Scrolls to `offset` (clamped).
    pub fn scroll_to(&mut self, offset: u64) {
        self.flow.set_scroll_offset_clamped(offset);
    }

    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        self.flow.scroll_to_index(index, align)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell<ItemId, R::Content>> + '_ {
        self.flow.cells()
    }

    pub fn cell_at(&self, index: usize) -> Option<&Cell<ItemId, R::Content>> {
        self.flow.cell_at(index)
    }

    /// The item a materialized cell is bound to, if the cell still shows it.
    pub fn item_of(&self, cell: &Cell<ItemId, R::Content>) -> Option<&Rc<T>> {
        let entry = self.items.entries().get(cell.index()?)?;
        (cell.key() == Some(&entry.id())).then(|| entry.item())
    }

    fn notify(&mut self, change: &Change) -> Result<(), FlowError> {
        ctrace!(?change, len = self.items.len(), "ListView::notify");
        let rows = Rows {
            entries: self.items.entries(),
            renderer: &self.renderer,
        };
        self.flow.on_backing_sequence_changed(change, &rows)
    }
}

impl<T> ListView<T, TextRenderer<T>> {
    pub fn cell_text(&self, index: usize) -> Option<&str> {
        self.flow
            .cell_at(index)?
            .content()
            .map(alloc::string::String::as_str)
    }
}

impl<T> ListView<T, Columns<T>> {
    pub fn columns(&self) -> &Columns<T> {
        &self.renderer
    }

    /// The rendered row of a materialized cell.
    pub fn row_at(&self, index: usize) -> Option<&RowContent> {
        self.flow.cell_at(index)?.content()
    }

    /// Text of `column` in the row cell at `index`.
    pub fn cell_text(&self, index: usize, column: usize) -> Option<&str> {
        self.row_at(index)?.column(column)
    }
}
