use alloc::sync::Arc;

use crate::{MovePolicy, PulseReport};

/// A callback fired at the end of every pulse.
pub type OnPulseCallback = Arc<dyn Fn(&PulseReport) + Send + Sync>;

/// Initial scroll offset configuration.
#[derive(Clone)]
pub enum InitialOffset {
    /// A fixed initial offset.
    Value(u64),
    /// A lazily evaluated initial offset provider (called by `CellFlow::new`).
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn resolve(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Configuration for [`crate::CellFlow`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
#[derive(Clone)]
pub struct FlowOptions {
    /// Length of the backing sequence when the flow is created.
    ///
    /// After construction the flow tracks the length through change notifications.
    pub count: usize,

    /// Fixed cell size along the scroll axis, in pixels. Zero is treated as one.
    pub cell_size: u32,

    /// Viewport size along the scroll axis, in pixels.
    pub initial_viewport_size: u32,

    /// Extra cells materialized on each side of the visible range.
    pub overscan: usize,

    pub initial_offset: InitialOffset,

    /// How `Change::Moved` and `Change::Permuted` treat the moved items' cells.
    pub move_policy: MovePolicy,

    pub on_pulse: Option<OnPulseCallback>,
}

impl FlowOptions {
    pub fn new(count: usize, cell_size: u32) -> Self {
        Self {
            count,
            cell_size,
            initial_viewport_size: 0,
            overscan: 1,
            initial_offset: InitialOffset::default(),
            move_policy: MovePolicy::PreserveIdentity,
            on_pulse: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_viewport_size(mut self, viewport_size: u32) -> Self {
        self.initial_viewport_size = viewport_size;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: InitialOffset) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_initial_offset_value(mut self, initial_offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(initial_offset);
        self
    }

    pub fn with_initial_offset_provider(
        mut self,
        initial_offset: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.initial_offset = InitialOffset::Provider(Arc::new(initial_offset));
        self
    }

    pub fn with_move_policy(mut self, move_policy: MovePolicy) -> Self {
        self.move_policy = move_policy;
        self
    }

    pub fn with_on_pulse(
        mut self,
        on_pulse: Option<impl Fn(&PulseReport) + Send + Sync + 'static>,
    ) -> Self {
        self.on_pulse = on_pulse.map(|f| Arc::new(f) as _);
        self
    }

    pub(crate) fn effective_cell_size(&self) -> u64 {
        self.cell_size.max(1) as u64
    }
}

impl core::fmt::Debug for FlowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlowOptions")
            .field("count", &self.count)
            .field("cell_size", &self.cell_size)
            .field("initial_viewport_size", &self.initial_viewport_size)
            .field("overscan", &self.overscan)
            .field("initial_offset", &self.initial_offset)
            .field("move_policy", &self.move_policy)
            .finish_non_exhaustive()
    }
}
