use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

/// A shared, observable value.
///
/// Every `set`/`update` bumps a revision counter. Renderers report that revision to the flow,
/// which rebinds cells showing the property on the next pulse without an explicit refresh.
///
/// Clones share the same value.
pub struct Property<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    value: RefCell<T>,
    revision: Cell<u64>,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                revision: Cell::new(0),
            }),
        }
    }

    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.bump();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.bump();
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Whether both handles share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn bump(&self) {
        let next = self.inner.revision.get().wrapping_add(1);
        self.inner.revision.set(next);
    }
}

impl<T: Clone> Property<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.inner.value.borrow())
            .field("revision", &self.revision())
            .finish()
    }
}
