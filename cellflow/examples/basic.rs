// Example: materialize a window, scroll, and watch cells being recycled.
use cellflow::{Align, CellFlow, FlowOptions};

fn main() {
    let items: Vec<u32> = (0..1_000).collect();
    let mut flow = CellFlow::new(FlowOptions::new(items.len(), 20).with_viewport_size(200));

    let report = flow.pulse(items.as_slice()).unwrap();
    println!("first pulse: {report:?}");
    println!("window={:?} cells={}", flow.window(), flow.materialized_len());

    flow.set_scroll_offset_clamped(5_000);
    let report = flow.pulse(items.as_slice()).unwrap();
    println!(
        "after scroll: created={} reused={} released={}",
        report.created, report.reused, report.released
    );

    flow.scroll_to_index(999, Align::End);
    flow.pulse(items.as_slice()).unwrap();
    println!(
        "at end: offset={} first={:?} allocated={}",
        flow.scroll_offset(),
        flow.materialized_span(),
        flow.allocated_len()
    );
}
