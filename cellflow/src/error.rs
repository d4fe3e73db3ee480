use crate::Change;

/// Contract violations reported by [`crate::CellFlow`].
///
/// Pool inconsistencies are not represented here: they indicate a bug in the reconciler and
/// panic instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("index {index} out of bounds for {count} items")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("range {start_index}..{end_index} out of bounds for {count} items")]
    RangeOutOfBounds {
        start_index: usize,
        end_index: usize,
        count: usize,
    },

    #[error("invalid change {change:?} for {count} items")]
    InvalidChange { change: Change, count: usize },

    #[error("backing sequence has {actual} items, reconciler expects {expected}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("cell bound at index {index} does not show the item currently at that index")]
    BindingMismatch { index: usize },
}
