//! Capability contract between the relay and its collaborators.
//!
//! The relay never stores field values and never inspects them; it only
//! needs a container to enumerate and look up its fields, a field to report
//! its current value and (optionally) accept a change callback, and a
//! listener to receive the normalized event. Anything satisfying these
//! traits can be watched — [`crate::Record`] and [`crate::ObservableCell`]
//! are the bundled implementations.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::event::ContainerChanged;

/// Identifier of a field within its container.
pub type FieldId = String;

/// Callback invoked by an observable field after each value change.
pub type ChangeCallback = Rc<dyn Fn()>;

/// An entity grouping zero or more named fields.
///
/// Containers are tracked by `Rc` allocation identity, never by value
/// equality: two structurally equal containers are two distinct watches.
pub trait Container {
    /// Identifiers of the currently present fields, in a stable order.
    fn field_ids(&self) -> Vec<FieldId>;

    /// Look up a field by identifier.
    ///
    /// Must return the same field instance for the same id for as long as
    /// the container is watched.
    fn field(&self, id: &str) -> Option<Rc<dyn Field>>;
}

/// A single named, value-holding member of a container.
pub trait Field {
    /// The field's current value, type-erased.
    fn current_value(&self) -> Rc<dyn Any>;

    /// Capability query: fields that support change notification return
    /// themselves as an [`ObservableField`].
    ///
    /// The default is `None`; the relay silently skips such fields when
    /// watching a container.
    fn as_observable(&self) -> Option<&dyn ObservableField> {
        None
    }
}

/// A [`Field`] that can notify a callback after each value change.
pub trait ObservableField: Field {
    /// Register `callback` to run after every value change.
    ///
    /// The registration lives exactly as long as the returned
    /// [`WatchHandle`]: dropping the guard unsubscribes the callback.
    fn subscribe(&self, callback: ChangeCallback) -> WatchHandle;
}

/// Receiver of normalized change events, registered on a
/// [`Relay`](crate::Relay).
///
/// Listener identity (the `Rc` allocation) is what the relay deduplicates
/// and removes by; the relay itself holds only a weak reference.
pub trait ChangeListener {
    /// Called once per field value change on any watched container.
    fn container_changed(&self, event: &ContainerChanged);
}

/// RAII guard for a change-callback registration.
///
/// The guard keeps a type-erased strong reference to the callback alive;
/// the issuing field holds only a `Weak`. Dropping the guard is the
/// unsubscribe operation: the field's weak reference loses its referent and
/// is pruned on the next notification cycle.
pub struct WatchHandle {
    _guard: Box<dyn Any>,
}

impl WatchHandle {
    /// Wrap whatever strong reference keeps the registration alive.
    #[must_use]
    pub fn new(guard: impl Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle").finish_non_exhaustive()
    }
}
