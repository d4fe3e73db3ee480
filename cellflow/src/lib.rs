//! A headless virtual cell reconciler.
//!
//! For list/table/tree controls built on top of it, see the `cellflow-controls` crate.
//!
//! A scrolling view over a long list only needs a handful of cells at a time. This crate keeps a
//! bounded pool of reusable cells bound to the visible window of an unbounded backing sequence
//! and decides, on scroll, resize, data change and refresh, which cells keep their identity and
//! which get rebound:
//!
//! - cells that stay visible are never reallocated or rebound by scrolling
//! - cells follow their item across inserts, removals and moves
//! - content is a snapshot: plain item mutations need [`CellFlow::refresh`], reactive fields
//!   propagate through [`ItemSource::revision`]
//! - all work is coalesced into [`CellFlow::pulse`]
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport size and scroll offset
//! - a fixed cell size
//! - an [`ItemSource`] over its data
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cell;
mod error;
mod flow;
mod key;
mod options;
mod pool;
mod source;
mod state;
mod types;


pub use cell::Cell;
pub use error::FlowError;
pub use flow::CellFlow;
pub use key::ItemKey;
pub use options::{FlowOptions, InitialOffset, OnPulseCallback};
pub use source::ItemSource;
pub use state::{FrameState, ScrollState, ViewportState};
pub use types::{Align, BindingState, CellId, Change, IndexRange, MovePolicy, PulseReport};
