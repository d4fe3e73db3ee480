// Example: expanding a node shifts the rows below it without rebinding them.
use cellflow_controls::{FlowOptions, TextRenderer, TreeItem, TreeView};

fn main() {
    let docs: TreeItem<&str> =
        TreeItem::with_children("docs", ["intro.md", "guide.md"].map(TreeItem::new));
    let root: TreeItem<&str> =
        TreeItem::with_children("/", [docs.clone(), TreeItem::new("Cargo.toml")]).expanded(true);

    let mut view = TreeView::new(
        root,
        TextRenderer::new(|name: &&str| (*name).into()),
        FlowOptions::new(0, 16).with_viewport_size(160),
    );
    view.pulse().unwrap();
    let cargo = view.cell_at(2).unwrap().id();

    view.set_expanded(&docs, true).unwrap();
    let report = view.pulse().unwrap();
    for row in 0..view.row_count() {
        let depth = view.row_depth(row).unwrap_or(0);
        println!("{}{}", "  ".repeat(depth), view.cell_text(row).unwrap_or("?"));
    }
    println!(
        "created={} rebound={} Cargo.toml cell moved to {:?}",
        report.created,
        report.rebound,
        view.flow().cell(cargo).and_then(|c| c.index())
    );
}
