use crate::*;

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use cellflow::{Align, CellId, Change};

/// `first_name` is a plain field, `last_name` is observable.
#[derive(Debug)]
struct Person {
    first_name: RefCell<String>,
    last_name: Property<String>,
}

impl Person {
    fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: RefCell::new(first_name.to_string()),
            last_name: Property::new(last_name.to_string()),
        }
    }

    fn persons() -> Vec<Person> {
        alloc::vec![
            Person::new("Jacob", "Smith"),
            Person::new("Isabella", "Johnson"),
            Person::new("Ethan", "Williams"),
            Person::new("Emma", "Jones"),
            Person::new("Michael", "Brown"),
        ]
    }

    fn first_name(&self) -> String {
        self.first_name.borrow().clone()
    }

    /// Plain setter: nothing is notified.
    fn set_first_name(&self, name: &str) {
        *self.first_name.borrow_mut() = name.to_string();
    }
}

fn options() -> FlowOptions {
    FlowOptions::new(0, 24).with_viewport_size(300)
}

fn name_columns() -> Columns<Person> {
    Columns::new()
        .with(Column::new("First", |p: &Person| CellValue::Text(p.first_name())))
        .with(Column::new("Last", |p: &Person| CellValue::Observed(p.last_name.clone())))
}

fn first_name_renderer() -> TextRenderer<Person> {
    TextRenderer::new(|p: &Person| CellValue::Text(p.first_name()))
}

fn table() -> TableView<Person> {
    TableView::new(
        Person::persons().into_iter().collect(),
        name_columns(),
        options(),
    )
}

fn ids<T, R: Renderer<T>>(view: &ListView<T, R>) -> Vec<CellId> {
    (0..view.items().len())
        .filter_map(|i| view.cell_at(i).map(|c| c.id()))
        .collect()
}

fn tree_ids<T, R: Renderer<T>>(view: &TreeView<T, R>) -> Vec<CellId> {
    (0..view.row_count())
        .filter_map(|i| view.cell_at(i).map(|c| c.id()))
        .collect()
}

fn family() -> (TreeItem<Person>, Vec<TreeItem<Person>>) {
    let children: Vec<TreeItem<Person>> =
        Person::persons().into_iter().map(TreeItem::new).collect();
    let root = TreeItem::with_children(Person::new("Root", ""), children.iter().cloned());
    (root, children)
}

#[test]
fn table_first_pulse_binds_every_row() {
    let mut view = table();
    let report = view.pulse().unwrap();

    assert!(report.laid_out);
    assert_eq!(report.created, 5);
    assert_eq!(view.flow().materialized_len(), 5);
    assert_eq!(view.cell_text(0, 0), Some("Jacob"));
    assert_eq!(view.cell_text(4, 1), Some("Brown"));
    assert_eq!(view.row_at(2).map(RowContent::len), Some(2));
}

#[test]
fn table_refresh_keeps_cells() {
    let mut view = table();
    view.pulse().unwrap();
    let before = ids(&view);

    view.refresh();
    assert!(view.flow().is_refresh_pending());
    let report = view.pulse().unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.rebound, 5);
    assert_eq!(ids(&view), before);
    assert!(view.cells().all(|c| c.bind_count() == 2));
}

#[test]
fn table_plain_setter_needs_refresh() {
    let mut view = table();
    view.pulse().unwrap();

    view.items().get(0).unwrap().set_first_name("Jake");
    let report = view.pulse().unwrap();
    assert_eq!(report.rebound, 0);
    assert_eq!(view.cell_text(0, 0), Some("Jacob"));

    view.refresh();
    view.pulse().unwrap();
    assert_eq!(view.cell_text(0, 0), Some("Jake"));
}

#[test]
fn table_observed_column_updates_without_refresh() {
    let mut view = table();
    view.pulse().unwrap();
    let id = view.cell_at(0).unwrap().id();

    view.items().get(0).unwrap().last_name.set("Smythe".to_string());
    let report = view.pulse().unwrap();

    assert_eq!(report.rebound, 0);
    assert_eq!(report.updated, 1);
    assert_eq!(view.cell_text(0, 1), Some("Smythe"));
    assert_eq!(view.cell_at(0).unwrap().id(), id);
    assert!(view.cells().all(|c| c.bind_count() == 1));
}

#[test]
fn observed_column_change_does_not_leak_plain_edits() {
    let mut view = table();
    view.pulse().unwrap();
    let id = view.cell_at(0).unwrap().id();

    let jacob = Rc::clone(view.items().get(0).unwrap());
    jacob.set_first_name("Jake");
    jacob.last_name.set("Smythe".to_string());
    view.pulse().unwrap();

    assert_eq!(view.cell_text(0, 0), Some("Jacob"));
    assert_eq!(view.cell_text(0, 1), Some("Smythe"));

    view.refresh();
    view.pulse().unwrap();
    assert_eq!(view.cell_text(0, 0), Some("Jake"));
    assert_eq!(view.cell_text(0, 1), Some("Smythe"));
    assert_eq!(view.cell_at(0).unwrap().id(), id);
}

#[test]
fn tree_table_observed_column_keeps_plain_snapshot() {
    let (root, children) = family();
    let mut view: TreeTableView<Person> = TreeView::without_root(root, name_columns(), options());
    view.pulse().unwrap();

    children[2].value().set_first_name("Eli");
    children[2].value().last_name.set("Walker".to_string());
    let report = view.pulse().unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(view.cell_text(2, 0), Some("Ethan"));
    assert_eq!(view.cell_text(2, 1), Some("Walker"));
}

#[test]
fn list_refresh_keeps_cells() {
    let mut view = ListView::new(
        Person::persons().into_iter().collect(),
        first_name_renderer(),
        options(),
    );
    view.pulse().unwrap();
    let before = ids(&view);

    view.items().get(3).unwrap().set_first_name("Emily");
    view.refresh();
    view.pulse().unwrap();

    assert_eq!(ids(&view), before);
    assert_eq!(view.cell_text(3), Some("Emily"));
}

#[test]
fn list_display_renderer() {
    let mut view = ListView::new(
        (1..=3).collect::<ItemList<u32>>(),
        TextRenderer::display(),
        options(),
    );
    view.pulse().unwrap();
    assert_eq!(view.cell_text(2), Some("3"));
}

#[test]
fn tree_with_hidden_root_refresh_keeps_cells() {
    let (root, children) = family();
    let mut view = TreeView::without_root(root, first_name_renderer(), options());
    assert_eq!(view.row_count(), 5);

    view.pulse().unwrap();
    let before = tree_ids(&view);

    children[1].value().set_first_name("Bella");
    view.refresh();
    let report = view.pulse().unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(tree_ids(&view), before);
    assert_eq!(view.cell_text(1), Some("Bella"));
    assert_eq!(view.row_depth(1), Some(0));
}

#[test]
fn tree_table_with_hidden_root_refresh_keeps_cells() {
    let (root, children) = family();
    let mut view: TreeTableView<Person> = TreeView::without_root(root, name_columns(), options());
    view.pulse().unwrap();
    let before = tree_ids(&view);

    children[4].value().set_first_name("Mike");
    view.refresh();
    view.pulse().unwrap();

    assert_eq!(tree_ids(&view), before);
    assert_eq!(view.cell_text(4, 0), Some("Mike"));
    assert_eq!(view.cell_text(4, 1), Some("Brown"));
}

#[test]
fn tree_shown_root_is_row_zero() {
    let (root, _) = family();
    let root = root.expanded(true);
    let mut view = TreeView::new(root.clone(), first_name_renderer(), options());
    view.pulse().unwrap();

    assert_eq!(view.row_count(), 6);
    assert_eq!(view.cell_text(0), Some("Root"));
    assert_eq!(view.row_depth(1), Some(1));
    assert!(view.tree_item(0).unwrap().ptr_eq(&root));
}

#[test]
fn expand_and_collapse_shift_cells_without_rebinding() {
    let grandchildren: [TreeItem<Person>; 2] = [
        TreeItem::new(Person::new("Olivia", "Smith")),
        TreeItem::new(Person::new("Noah", "Smith")),
    ];
    let mut children: Vec<TreeItem<Person>> =
        Person::persons().into_iter().map(TreeItem::new).collect();
    let isabella = Person::new("Isabella", "Johnson");
    children[1] = TreeItem::with_children(isabella, grandchildren);
    let parent = children[1].clone();
    let root = TreeItem::with_children(Person::new("Root", ""), children).expanded(true);

    let mut view = TreeView::new(root, first_name_renderer(), options());
    view.pulse().unwrap();
    assert_eq!(view.row_count(), 6);
    let ethan = view.cell_at(3).unwrap().id();

    view.set_expanded(&parent, true).unwrap();
    assert_eq!(view.row_count(), 8);
    let report = view.pulse().unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.rebound, 0);
    assert_eq!(view.cell_at(5).unwrap().id(), ethan);
    assert_eq!(view.cell_at(5).unwrap().bind_count(), 1);
    assert_eq!(view.cell_text(3), Some("Olivia"));
    assert_eq!(view.row_depth(4), Some(2));

    view.set_expanded(&parent, false).unwrap();
    view.pulse().unwrap();

    assert_eq!(view.row_count(), 6);
    assert_eq!(view.cell_at(3).unwrap().id(), ethan);
    assert_eq!(view.flow().pooled_len(), 2);
}

#[test]
fn expanded_builder_sets_the_initial_rows() {
    let leaf: TreeItem<Person> = TreeItem::new(Person::new("Olivia", "Smith"));
    let parent = TreeItem::with_children(Person::new("Isabella", "Johnson"), [leaf]).expanded(true);
    let root = TreeItem::with_children(Person::new("Root", ""), [parent.clone()]);
    let mut view = TreeView::without_root(root, first_name_renderer(), options());
    view.pulse().unwrap();

    assert_eq!(view.row_count(), 2);
    assert_eq!(view.cell_text(1), Some("Olivia"));

    view.set_expanded(&parent, false).unwrap();
    view.pulse().unwrap();
    assert_eq!(view.row_count(), 1);
    assert_eq!(view.flow().count(), 1);
    assert!(!parent.is_expanded());
}

#[test]
fn tree_add_and_remove_child() {
    let (root, children) = family();
    let mut view = TreeView::without_root(root.clone(), first_name_renderer(), options());
    view.pulse().unwrap();
    let emma = view.cell_at(3).unwrap().id();

    view.add_child(&root, TreeItem::new(Person::new("Sophia", "Davis"))).unwrap();
    view.pulse().unwrap();
    assert_eq!(view.row_count(), 6);
    assert_eq!(view.cell_text(5), Some("Sophia"));

    let removed = view.remove_child(&root, 1).unwrap();
    assert!(removed.ptr_eq(&children[1]));
    view.pulse().unwrap();

    assert_eq!(view.row_count(), 5);
    assert_eq!(view.cell_at(2).unwrap().id(), emma);
    assert_eq!(view.row_of(&children[1]), None);
    assert_eq!(view.row_of(&children[2]), Some(1));

    assert_eq!(
        view.remove_child(&root, 9).unwrap_err(),
        FlowError::IndexOutOfBounds { index: 9, count: 5 }
    );
}

#[test]
fn toggling_root_visibility_inserts_the_root_row() {
    let (root, _) = family();
    let root = root.expanded(true);
    let mut view = TreeView::without_root(root, first_name_renderer(), options());
    view.pulse().unwrap();
    let jacob = view.cell_at(0).unwrap().id();

    view.set_show_root(true).unwrap();
    view.pulse().unwrap();

    assert_eq!(view.cell_text(0), Some("Root"));
    assert_eq!(view.cell_at(1).unwrap().id(), jacob);
}

#[test]
fn remove_releases_the_cell() {
    let mut view = table();
    view.pulse().unwrap();
    let isabella = view.cell_at(1).unwrap().id();
    let ethan = view.cell_at(2).unwrap().id();

    let removed = view.remove(1).unwrap();
    assert_eq!(removed.first_name(), "Isabella");
    assert!(!view.flow().is_materialized(isabella));

    view.pulse().unwrap();
    assert_eq!(view.cell_at(1).unwrap().id(), ethan);
    assert_eq!(view.flow().pooled_len(), 1);
}

#[test]
fn insert_shifts_cells_and_reuses_none_of_them() {
    let mut view = table();
    view.pulse().unwrap();
    let before = ids(&view);

    view.insert(0, Person::new("Sophia", "Davis")).unwrap();
    let report = view.pulse().unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(ids(&view)[1..], before[..]);
    assert_eq!(view.cell_text(0, 0), Some("Sophia"));

    assert!(matches!(
        view.insert(9, Person::new("X", "Y")),
        Err(FlowError::IndexOutOfBounds { index: 9, count: 6 })
    ));
}

#[test]
fn sort_keeps_cell_identity() {
    let mut view = table();
    view.pulse().unwrap();
    let by_name: Vec<(String, CellId)> = (0..5)
        .map(|i| {
            let cell = view.cell_at(i).unwrap();
            (view.cell_text(i, 0).unwrap().to_string(), cell.id())
        })
        .collect();

    view.sort_by(|a, b| a.first_name().cmp(&b.first_name())).unwrap();
    let report = view.pulse().unwrap();
    assert_eq!(report.rebound, 0);

    let order: Vec<_> = (0..5).map(|i| view.cell_text(i, 0).unwrap()).collect();
    assert_eq!(order, ["Emma", "Ethan", "Isabella", "Jacob", "Michael"]);
    for (name, id) in &by_name {
        let cell = view.flow().cell(*id).unwrap();
        assert_eq!(cell.content().unwrap().column(0), Some(name.as_str()));
        assert_eq!(cell.bind_count(), 1);
    }
}

#[test]
fn move_item_follows_the_item() {
    let mut view = table();
    view.pulse().unwrap();
    let jacob = view.cell_at(0).unwrap().id();

    view.move_item(0, 3).unwrap();
    view.pulse().unwrap();

    assert_eq!(view.cell_at(3).unwrap().id(), jacob);
    assert_eq!(view.cell_text(0, 0), Some("Isabella"));
}

#[test]
fn set_rebinds_the_cell_in_place() {
    let mut view = table();
    view.pulse().unwrap();
    let cell = view.cell_at(2).unwrap();
    let (id, key) = (cell.id(), *cell.key().unwrap());

    let old = view.set(2, Person::new("Liam", "Miller")).unwrap();
    assert_eq!(old.first_name(), "Ethan");
    let report = view.pulse().unwrap();

    let cell = view.cell_at(2).unwrap();
    assert_eq!(report.rebound, 1);
    assert_eq!(cell.id(), id);
    assert_ne!(*cell.key().unwrap(), key);
    assert_eq!(view.cell_text(2, 0), Some("Liam"));
}

#[test]
fn replace_all_reclaims_cells_by_identity() {
    let mut view = table();
    view.pulse().unwrap();
    let emma = view.cell_at(3).unwrap().id();

    let mut entries = view.items().entries().to_vec();
    entries.reverse();
    view.replace_all(entries).unwrap();
    view.pulse().unwrap();

    assert_eq!(view.cell_at(1).unwrap().id(), emma);
    assert_eq!(view.cell_text(1, 0), Some("Emma"));
}

#[test]
fn clear_releases_everything() {
    let mut view = table();
    view.pulse().unwrap();

    view.clear().unwrap();
    view.pulse().unwrap();

    assert_eq!(view.flow().materialized_len(), 0);
    assert_eq!(view.flow().pooled_len(), 5);
    assert!(view.cell_text(0, 0).is_none());
}

#[test]
fn item_of_returns_the_shared_item() {
    let shared: Vec<Rc<Person>> = Person::persons().into_iter().map(Rc::new).collect();
    let mut view = ListView::new(
        ItemList::from_shared(shared.iter().cloned()),
        first_name_renderer(),
        options(),
    );
    view.pulse().unwrap();

    let cell = view.cell_at(2).unwrap();
    assert!(Rc::ptr_eq(view.item_of(cell).unwrap(), &shared[2]));
}

#[test]
fn scrolling_recycles_rows() {
    let items: ItemList<u32> = (0..100).collect();
    let mut view = ListView::new(items, TextRenderer::display(), options());
    view.pulse().unwrap();
    assert_eq!(view.flow().materialized_len(), 14);

    view.scroll_to(24 * 50);
    let report = view.pulse().unwrap();

    assert_eq!(report.released, 14);
    assert_eq!(report.reused, 14);
    assert_eq!(report.created, 1);
    assert_eq!(view.flow().allocated_len(), 15);
    assert_eq!(view.cell_text(50), Some("50"));
    assert!(view.cell_at(0).is_none());

    let offset = view.scroll_to_index(99, Align::End);
    assert_eq!(offset, 100 * 24 - 300);
}

#[test]
fn property_revision_moves_on_every_write() {
    let p = Property::new(1);
    let q = p.clone();
    assert_eq!(p.revision(), 0);

    q.set(2);
    p.update(|v| *v += 1);

    assert_eq!(p.get(), 3);
    assert_eq!(p.revision(), 2);
    assert!(p.ptr_eq(&q));
}

#[test]
fn item_list_changes() {
    let mut list: ItemList<u32> = [3, 1, 2].into_iter().collect();

    assert_eq!(list.push(4), Change::Inserted { index: 3, count: 1 });
    assert_eq!(
        list.sort_by(|a, b| a.cmp(b)),
        Change::Permuted {
            start: 0,
            new_indexes: alloc::vec![2, 0, 1, 3],
        }
    );
    assert_eq!(list.iter().map(|v| **v).collect::<Vec<_>>(), [1, 2, 3, 4]);
    assert_eq!(list.clear(), Change::Removed { index: 0, count: 4 });
}
