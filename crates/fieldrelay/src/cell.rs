//! Shared observable value cell, the bundled [`ObservableField`]
//! implementation.
//!
//! [`ObservableCell<T>`] wraps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). When the value changes (determined by `PartialEq`),
//! all live subscribers run in registration order. Cloning a cell clones the
//! handle, not the value: both handles see the same state and share
//! subscribers.
//!
//! # Failure modes
//!
//! - **Re-entrant set**: calling `set` from within a change callback panics
//!   (`RefCell` borrow rules). Re-entrant mutation indicates a cycle in the
//!   subscriber graph.
//! - **Guard accumulation**: a registration lives as long as its
//!   [`WatchHandle`]; dead weak references are cleaned lazily while
//!   notifying.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::contract::{ChangeCallback, Field, ObservableField, WatchHandle};

type Callback<T> = Rc<dyn Fn(&T)>;

struct CellInner<T> {
    value: T,
    version: u64,
    /// Weak callback refs; entries whose guard was dropped are pruned on
    /// the next notify.
    subscribers: Vec<Weak<dyn Fn(&T)>>,
}

/// A shared, version-tracked value with change notification.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 per value-changing mutation.
/// 2. `set(v)` where `v == current` is a no-op: no version bump, no
///    notifications.
/// 3. Callbacks run in registration order, after the new value is stored.
pub struct ObservableCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

// Manual Clone: shares the same inner state.
impl<T> Clone for ObservableCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableCell<T> {
    /// Create a cell holding `value`, at version 0, with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value by reference, without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store a new value, notifying subscribers if it differs from the
    /// current one.
    ///
    /// # Panics
    ///
    /// Panics when called re-entrantly from within a change callback.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place, notifying subscribers if the result
    /// differs from a pre-mutation snapshot.
    ///
    /// # Panics
    ///
    /// Panics when called re-entrantly from within a change callback.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                false
            } else {
                inner.version += 1;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Register `f` to run with the new value after each change.
    ///
    /// The registration lives as long as the returned guard.
    pub fn on_change(&self, f: impl Fn(&T) + 'static) -> WatchHandle {
        let strong: Callback<T> = Rc::new(f);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        WatchHandle::new(strong)
    }

    /// Mutation counter; useful for dirty-checking.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscriber count, including dead entries not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        // Prune dead entries and snapshot live callbacks, then release the
        // borrow before running any of them.
        let live: Vec<Callback<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        let value = self.inner.borrow().value.clone();
        for callback in &live {
            callback(&value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> Field for ObservableCell<T> {
    fn current_value(&self) -> Rc<dyn Any> {
        Rc::new(self.get())
    }

    fn as_observable(&self) -> Option<&dyn ObservableField> {
        Some(self)
    }
}

impl<T: Clone + PartialEq + 'static> ObservableField for ObservableCell<T> {
    fn subscribe(&self, callback: ChangeCallback) -> WatchHandle {
        self.on_change(move |_| callback())
    }
}
