// Example: plain fields need `refresh()`, observed fields do not.
use std::cell::RefCell;

use cellflow_controls::{CellValue, Column, Columns, FlowOptions, Property, TableView};

struct Person {
    first_name: RefCell<String>,
    last_name: Property<String>,
}

impl Person {
    fn new(first: &str, last: &str) -> Self {
        Self {
            first_name: RefCell::new(first.to_string()),
            last_name: Property::new(last.to_string()),
        }
    }
}

fn print(view: &TableView<Person>, label: &str) {
    let rows: Vec<String> = (0..view.items().len())
        .filter_map(|i| view.row_at(i))
        .map(|row| row.iter().collect::<Vec<_>>().join(" "))
        .collect();
    println!("{label}: {rows:?}");
}

fn main() {
    let columns = Columns::new()
        .with(Column::new("First", |p: &Person| {
            CellValue::Text(p.first_name.borrow().clone())
        }))
        .with(Column::new("Last", |p: &Person| CellValue::Observed(p.last_name.clone())));
    let people = [
        Person::new("Jacob", "Smith"),
        Person::new("Isabella", "Johnson"),
        Person::new("Ethan", "Williams"),
    ];
    let mut view = TableView::new(
        people.into_iter().collect(),
        columns,
        FlowOptions::new(0, 24).with_viewport_size(300),
    );
    view.pulse().unwrap();
    print(&view, "initial");

    let jacob = view.items().get(0).unwrap().clone();
    *jacob.first_name.borrow_mut() = "Jake".to_string();
    view.pulse().unwrap();
    print(&view, "plain edit, no refresh");

    view.refresh();
    view.pulse().unwrap();
    print(&view, "after refresh");

    jacob.last_name.set("Smythe".to_string());
    let report = view.pulse().unwrap();
    print(&view, "observed edit");
    println!("updated={} rebound={}", report.updated, report.rebound);
}
