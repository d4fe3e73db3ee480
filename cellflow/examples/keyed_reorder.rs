// Example: cells follow their items across inserts and moves.
use cellflow::{CellFlow, Change, FlowOptions, MovePolicy};

fn main() {
    let mut items = vec!["a", "b", "c", "d"];
    let mut flow = CellFlow::new(FlowOptions::new(items.len(), 1).with_viewport_size(10));
    flow.pulse(items.as_slice()).unwrap();
    let c = flow.cell_at(2).unwrap().id();

    items.insert(0, "z");
    let change = Change::Inserted { index: 0, count: 1 };
    flow.on_backing_sequence_changed(&change, items.as_slice()).unwrap();
    flow.pulse(items.as_slice()).unwrap();
    println!("after insert: cell {c:?} at {:?}", flow.cell(c).unwrap().index());

    let moved = items.remove(3);
    items.insert(0, moved);
    let change = Change::Moved { from: 3, to: 0 };
    flow.on_backing_sequence_changed(&change, items.as_slice()).unwrap();
    let report = flow.pulse(items.as_slice()).unwrap();
    println!(
        "after move: cell {c:?} at {:?}, rebound={}",
        flow.cell(c).unwrap().index(),
        report.rebound
    );

    // Under `RemoveInsert` a moved item is rebound, though usually in the same cell.
    flow.set_move_policy(MovePolicy::RemoveInsert);
    let moved = items.remove(0);
    items.insert(4, moved);
    let change = Change::Moved { from: 0, to: 4 };
    flow.on_backing_sequence_changed(&change, items.as_slice()).unwrap();
    flow.pulse(items.as_slice()).unwrap();
    let cell = flow.cell(c).unwrap();
    println!("remove/insert: index={:?} binds={}", cell.index(), cell.bind_count());
}
