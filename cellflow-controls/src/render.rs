use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::Property;

/// The value a cell factory produces for one item.
#[derive(Clone, Debug)]
pub enum CellValue {
    /// A snapshot. Later changes to the item are only shown after a refresh.
    Text(String),
    /// A reactive binding. Changes propagate on the next pulse.
    Observed(Property<String>),
}

impl CellValue {
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Observed(p) => p.get(),
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            Self::Text(_) => 0,
            Self::Observed(p) => p.revision(),
        }
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Property<String>> for CellValue {
    fn from(p: Property<String>) -> Self {
        Self::Observed(p)
    }
}

/// Turns an item into cell content.
pub trait Renderer<T> {
    type Content;

    fn render(&self, item: &T) -> Self::Content;

    /// Combined revision of the reactive values `render` reads.
    fn revision(&self, _item: &T) -> u64 {
        0
    }

    /// Refreshes only the reactive parts of `content` after `revision` moved.
    fn update(&self, item: &T, content: &mut Self::Content) {
        *content = self.render(item);
    }
}

type ValueFactory<T> = Rc<dyn Fn(&T) -> CellValue>;

/// Renders each item as a single line of text (list and tree cells).
pub struct TextRenderer<T> {
    value: ValueFactory<T>,
}

impl<T> TextRenderer<T> {
    pub fn new(value: impl Fn(&T) -> CellValue + 'static) -> Self {
        Self {
            value: Rc::new(value),
        }
    }
}

impl<T: fmt::Display> TextRenderer<T> {
    /// Renders items with their `Display` impl.
    pub fn display() -> Self {
        Self::new(|item: &T| CellValue::Text(item.to_string()))
    }
}

impl<T> Clone for TextRenderer<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Renderer<T> for TextRenderer<T> {
    type Content = String;

    fn render(&self, item: &T) -> String {
        (self.value)(item).text()
    }

    fn revision(&self, item: &T) -> u64 {
        (self.value)(item).revision()
    }
}

/// A table column: a title plus a cell value factory.
pub struct Column<T> {
    title: String,
    value: ValueFactory<T>,
}

impl<T> Column<T> {
    pub fn new(title: impl Into<String>, value: impl Fn(&T) -> CellValue + 'static) -> Self {
        Self {
            title: title.into(),
            value: Rc::new(value),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self, item: &T) -> CellValue {
        (self.value)(item)
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Renders each item as a table row with one text per column.
pub struct Columns<T> {
    columns: Vec<Column<T>>,
}

impl<T> Columns<T> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn with(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn push(&mut self, column: Column<T>) {
        self.columns.push(column);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column<T>> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column<T>> + '_ {
        self.columns.iter()
    }
}

impl<T> Default for Columns<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<Column<T>>> for Columns<T> {
    fn from(columns: Vec<Column<T>>) -> Self {
        Self { columns }
    }
}

impl<T> Renderer<T> for Columns<T> {
    type Content = RowContent;

    fn render(&self, item: &T) -> RowContent {
        let (texts, revisions) = self
            .columns
            .iter()
            .map(|c| {
                let value = c.value(item);
                (value.text(), value.revision())
            })
            .unzip();
        RowContent { texts, revisions }
    }

    // Revisions only grow, so the sum moves whenever any observed column changes.
    fn revision(&self, item: &T) -> u64 {
        self.columns
            .iter()
            .fold(0u64, |acc, c| acc.wrapping_add(c.value(item).revision()))
    }

    // Plain columns keep their bound text; only observed columns that moved are re-read.
    fn update(&self, item: &T, row: &mut RowContent) {
        if row.texts.len() != self.columns.len() || row.revisions.len() != self.columns.len() {
            *row = self.render(item);
            return;
        }
        for (i, column) in self.columns.iter().enumerate() {
            let CellValue::Observed(p) = column.value(item) else {
                continue;
            };
            if p.revision() != row.revisions[i] {
                row.texts[i] = p.get();
                row.revisions[i] = p.revision();
            }
        }
    }
}

/// Rendered texts of one table row, in column order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowContent {
    texts: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    revisions: Vec<u64>,
}

impl RowContent {
    pub fn column(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.texts.iter().map(String::as_str)
    }
}
