use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell as Flag, RefCell};
use core::fmt;

use cellflow::{Align, Cell, CellFlow, Change, FlowError, FlowOptions, PulseReport};

use crate::rows::Rows;
use crate::{Columns, Entry, ItemId, Renderer, RowContent, TextRenderer};

/// A node of a tree shown by [`TreeView`].
///
/// Clones share the node. New nodes start collapsed.
pub struct TreeItem<T> {
    node: Rc<Node<T>>,
}

struct Node<T> {
    id: ItemId,
    value: Rc<T>,
    children: RefCell<Vec<TreeItem<T>>>,
    expanded: Flag<bool>,
}

impl<T> TreeItem<T> {
    pub fn new(value: impl Into<Rc<T>>) -> Self {
        Self {
            node: Rc::new(Node {
                id: ItemId::next(),
                value: value.into(),
                children: RefCell::new(Vec::new()),
                expanded: Flag::new(false),
            }),
        }
    }

    pub fn with_children(
        value: impl Into<Rc<T>>,
        children: impl IntoIterator<Item = TreeItem<T>>,
    ) -> Self {
        let item = Self::new(value);
        item.node.children.borrow_mut().extend(children);
        item
    }

    /// Sets the initial expansion state while building a tree.
    ///
    /// Only use this before the tree is handed to [`TreeView::new`] or
    /// [`TreeView::without_root`]. A shown node must be toggled with [`TreeView::set_expanded`],
    /// otherwise the view's rows no longer match the tree.
    pub fn expanded(self, expanded: bool) -> Self {
        self.node.expanded.set(expanded);
        self
    }

    pub fn id(&self) -> ItemId {
        self.node.id
    }

    pub fn value(&self) -> &Rc<T> {
        &self.node.value
    }

    pub fn is_expanded(&self) -> bool {
        self.node.expanded.get()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.children.borrow().is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.node.children.borrow().len()
    }

    pub fn child(&self, index: usize) -> Option<TreeItem<T>> {
        self.node.children.borrow().get(index).cloned()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    // Structural setters are crate-private: a `TreeView` must hear about every change.

    pub(crate) fn set_expanded(&self, expanded: bool) {
        self.node.expanded.set(expanded);
    }

    pub(crate) fn insert_child(&self, index: usize, child: TreeItem<T>) -> Result<(), FlowError> {
        let mut children = self.node.children.borrow_mut();
        if index > children.len() {
            return Err(FlowError::IndexOutOfBounds {
                index,
                count: children.len(),
            });
        }
        children.insert(index, child);
        Ok(())
    }

    pub(crate) fn remove_child(&self, index: usize) -> Result<TreeItem<T>, FlowError> {
        let mut children = self.node.children.borrow_mut();
        if index >= children.len() {
            return Err(FlowError::IndexOutOfBounds {
                index,
                count: children.len(),
            });
        }
        Ok(children.remove(index))
    }
}

impl<T> Clone for TreeItem<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeItem")
            .field("id", &self.node.id)
            .field("value", &self.node.value)
            .field("expanded", &self.node.expanded.get())
            .field("children", &self.node.children.borrow().len())
            .finish()
    }
}

/// A virtualized tree: rows are the depth-first flattening of expanded nodes.
///
/// A hidden root always shows its children. Structural changes made through the view are
/// reported to the flow as inserts/removals when they touch a single contiguous block of rows
/// (expand, collapse, add/remove a child), and as a reset otherwise.
pub struct TreeView<T, R: Renderer<T> = TextRenderer<T>> {
    root: TreeItem<T>,
    show_root: bool,
    rows: Vec<Entry<T>>,
    depths: Vec<usize>,
    nodes: Vec<TreeItem<T>>,
    renderer: R,
    flow: CellFlow<ItemId, R::Content>,
}

/// A virtualized tree with table rows.
pub type TreeTableView<T> = TreeView<T, Columns<T>>;

impl<T, R: Renderer<T>> TreeView<T, R> {
    /// Creates the control with the root shown. `options.count` is overwritten.
    pub fn new(root: TreeItem<T>, renderer: R, options: FlowOptions) -> Self {
        let (rows, depths, nodes) = flatten(&root, true);
        let flow = CellFlow::new(options.with_count(rows.len()));
        Self {
            root,
            show_root: true,
            rows,
            depths,
            nodes,
            renderer,
            flow,
        }
    }

    /// Creates the control with the root hidden; its children are always shown.
    pub fn without_root(root: TreeItem<T>, renderer: R, options: FlowOptions) -> Self {
        let (rows, depths, nodes) = flatten(&root, false);
        let flow = CellFlow::new(options.with_count(rows.len()));
        Self {
            root,
            show_root: false,
            rows,
            depths,
            nodes,
            renderer,
            flow,
        }
    }

    pub fn root(&self) -> &TreeItem<T> {
        &self.root
    }

    pub fn flow(&self) -> &CellFlow<ItemId, R::Content> {
        &self.flow
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn show_root(&self) -> bool {
        self.show_root
    }

    pub fn set_show_root(&mut self, show_root: bool) -> Result<(), FlowError> {
        if self.show_root == show_root {
            return Ok(());
        }
        self.show_root = show_root;
        self.sync()
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn tree_item(&self, row: usize) -> Option<&TreeItem<T>> {
        self.nodes.get(row)
    }

    pub fn row_depth(&self, row: usize) -> Option<usize> {
        self.depths.get(row).copied()
    }

    pub fn row_of(&self, item: &TreeItem<T>) -> Option<usize> {
        self.rows.iter().position(|e| e.id() == item.id())
    }

    pub fn set_expanded(&mut self, item: &TreeItem<T>, expanded: bool) -> Result<(), FlowError> {
        if item.is_expanded() == expanded {
            return Ok(());
        }
        item.set_expanded(expanded);
        self.sync()
    }

    pub fn insert_child(
        &mut self,
        parent: &TreeItem<T>,
        index: usize,
        child: TreeItem<T>,
    ) -> Result<(), FlowError> {
        parent.insert_child(index, child)?;
        self.sync()
    }

    pub fn add_child(&mut self, parent: &TreeItem<T>, child: TreeItem<T>) -> Result<(), FlowError> {
        let index = parent.child_count();
        self.insert_child(parent, index, child)
    }

    pub fn remove_child(
        &mut self,
        parent: &TreeItem<T>,
        index: usize,
    ) -> Result<TreeItem<T>, FlowError> {
        let child = parent.remove_child(index)?;
        self.sync()?;
        Ok(child)
    }

    pub fn refresh(&mut self) {
        self.flow.refresh();
    }

    pub fn pulse(&mut self) -> Result<PulseReport, FlowError> {
        let rows = Rows {
            entries: &self.rows,
            renderer: &self.renderer,
        };
        self.flow.pulse(&rows)
    }

    pub fn resize(&mut self, viewport_size: u32) {
        self.flow.set_viewport_size(viewport_size);
    }

    pub fn scroll_to(&mut self, offset: u64) {
        self.flow.set_scroll_offset_clamped(offset);
    }

    pub fn scroll_to_index(&mut self, row: usize, align: Align) -> u64 {
        self.flow.scroll_to_index(row, align)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell<ItemId, R::Content>> + '_ {
        self.flow.cells()
    }

    pub fn cell_at(&self, row: usize) -> Option<&Cell<ItemId, R::Content>> {
        self.flow.cell_at(row)
    }

    /// The value a materialized cell is bound to, if the cell still shows it.
    pub fn item_of(&self, cell: &Cell<ItemId, R::Content>) -> Option<&Rc<T>> {
        let entry = self.rows.get(cell.index()?)?;
        (cell.key() == Some(&entry.id())).then(|| entry.item())
    }

    /// Re-flattens the tree and reports the difference to the flow.
    fn sync(&mut self) -> Result<(), FlowError> {
        let (rows, depths, nodes) = flatten(&self.root, self.show_root);
        let change = block_change(&self.rows, &rows);
        self.rows = rows;
        self.depths = depths;
        self.nodes = nodes;
        let Some(change) = change else {
            return Ok(());
        };
        cdebug!(?change, rows = self.rows.len(), "TreeView::sync");
        let rows = Rows {
            entries: &self.rows,
            renderer: &self.renderer,
        };
        self.flow.on_backing_sequence_changed(&change, &rows)
    }
}

impl<T> TreeView<T, TextRenderer<T>> {
    pub fn cell_text(&self, row: usize) -> Option<&str> {
        self.flow
            .cell_at(row)?
            .content()
            .map(alloc::string::String::as_str)
    }
}

impl<T> TreeView<T, Columns<T>> {
    pub fn row_at(&self, row: usize) -> Option<&RowContent> {
        self.flow.cell_at(row)?.content()
    }

    pub fn cell_text(&self, row: usize, column: usize) -> Option<&str> {
        self.row_at(row)?.column(column)
    }
}

type Flat<T> = (Vec<Entry<T>>, Vec<usize>, Vec<TreeItem<T>>);

/// Depth-first flattening of the expanded part of the tree.
fn flatten<T>(root: &TreeItem<T>, show_root: bool) -> Flat<T> {
    let mut rows = Vec::new();
    let mut depths = Vec::new();
    let mut nodes = Vec::new();

    let mut stack: Vec<(TreeItem<T>, usize)> = Vec::new();
    if show_root {
        stack.push((root.clone(), 0));
    } else {
        push_children(&mut stack, root, 0);
    }

    while let Some((item, depth)) = stack.pop() {
        rows.push(Entry::new(item.id(), Rc::clone(item.value())));
        depths.push(depth);
        if item.is_expanded() {
            push_children(&mut stack, &item, depth + 1);
        }
        nodes.push(item);
    }
    (rows, depths, nodes)
}

/// Pushes children in reverse so they pop in order.
fn push_children<T>(stack: &mut Vec<(TreeItem<T>, usize)>, parent: &TreeItem<T>, depth: usize) {
    let children = parent.node.children.borrow();
    stack.extend(children.iter().rev().map(|c| (c.clone(), depth)));
}

/// Describes `old -> new` as one contiguous insert or removal when possible.
fn block_change<T>(old: &[Entry<T>], new: &[Entry<T>]) -> Option<Change> {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.id() == b.id())
        .count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a.id() == b.id())
        .count();

    let removed = old.len() - prefix - suffix;
    let inserted = new.len() - prefix - suffix;
    match (removed, inserted) {
        (0, 0) => None,
        (0, count) => Some(Change::Inserted {
            index: prefix,
            count,
        }),
        (count, 0) => Some(Change::Removed {
            index: prefix,
            count,
        }),
        _ => Some(Change::Reset),
    }
}
