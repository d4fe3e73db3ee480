//! List, table and tree controls for the `cellflow` crate.
//!
//! `cellflow` only reconciles cells against an abstract item source. This crate provides the
//! owning controls most adapters need, without binding to any UI toolkit:
//!
//! - [`ListView`] and [`TableView`] over an identity-bearing [`ItemList`]
//! - [`TreeView`] and [`TreeTableView`] over [`TreeItem`] nodes
//! - [`Property`], a minimal reactive value whose changes reach cells without a refresh
//!
//! Controls are single-threaded (`Rc`-based). Drive them by mutating through the control, then
//! calling `pulse()` once per frame.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod items;
mod list;
mod property;
mod render;
mod rows;
mod tree;

#[cfg(test)]
mod tests;

pub use items::{Entry, ItemId, ItemList};
pub use list::{ListView, TableView};
pub use property::Property;
pub use render::{CellValue, Column, Columns, Renderer, RowContent, TextRenderer};
pub use tree::{TreeItem, TreeTableView, TreeView};

pub use cellflow::{FlowError, FlowOptions, PulseReport};
