use crate::{BindingState, CellId};

/// A reusable view slot.
///
/// Cells are owned by the reconciler. Outside code can only read them; binding changes go
/// through [`crate::CellFlow`].
#[derive(Clone, Debug)]
pub struct Cell<K, V> {
    id: CellId,
    index: Option<usize>,
    key: Option<K>,
    content: Option<V>,
    state: BindingState,
    revision: u64,
    binds: u64,
}

impl<K, V> Cell<K, V> {
    pub(crate) fn new(id: CellId) -> Self {
        Self {
            id,
            index: None,
            key: None,
            content: None,
            state: BindingState::Current,
            revision: 0,
            binds: 0,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    /// The index this cell is bound to, or `None` while it sits in the pool.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Key of the item this cell was last bound to.
    ///
    /// Pooled cells keep the key of their last item, which lets the reconciler hand the same
    /// cell back when that item scrolls into view again.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// The content snapshot taken when the cell was last bound.
    pub fn content(&self) -> Option<&V> {
        self.content.as_ref()
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn is_current(&self) -> bool {
        self.state == BindingState::Current
    }

    /// Source revision observed at the last bind.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// How many times content was (re)bound into this cell.
    ///
    /// Reactive updates of a current cell do not count as binds.
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    pub(crate) fn bind(&mut self, index: usize, key: K, content: V, revision: u64) {
        self.index = Some(index);
        self.key = Some(key);
        self.content = Some(content);
        self.state = BindingState::Current;
        self.revision = revision;
        self.binds = self.binds.saturating_add(1);
    }

    /// Applies a reactive update in place. Returns `false` if the cell holds no content.
    pub(crate) fn update(&mut self, revision: u64, f: impl FnOnce(&mut V)) -> bool {
        let Some(content) = self.content.as_mut() else {
            return false;
        };
        f(content);
        self.revision = revision;
        true
    }

    pub(crate) fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.state = BindingState::Stale;
    }
}
