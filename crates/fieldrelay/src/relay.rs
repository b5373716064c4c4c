//! The relay facade and its subscription bookkeeping.
//!
//! Ownership is a tree with explicit teardown: [`Relay`] owns one
//! [`ContainerWatch`] per watched container, each of which owns one
//! [`FieldSubscription`] per observable field. Removing any node drops its
//! subscription guards, which releases the underlying callback
//! registrations on every removal path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::contract::{ChangeListener, Container, Field, FieldId, WatchHandle};
use crate::event::ContainerChanged;

/// Hashable container identity: the `Rc` data pointer, metadata stripped.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct ContainerKey(*const ());

impl ContainerKey {
    fn of(container: &Rc<dyn Container>) -> Self {
        Self(Rc::as_ptr(container).cast::<()>())
    }
}

/// Registered listeners, in registration order.
///
/// Entries are weak: the relay never owns a listener. Dead entries (caller
/// dropped the `Rc`) are pruned lazily while snapshotting for delivery.
#[derive(Default)]
struct ListenerSet {
    entries: Vec<Weak<dyn ChangeListener>>,
}

impl ListenerSet {
    fn contains(&self, listener: &Rc<dyn ChangeListener>) -> bool {
        let target = Rc::as_ptr(listener).cast::<()>();
        self.entries
            .iter()
            .any(|entry| entry.as_ptr().cast::<()>() == target)
    }

    fn add(&mut self, listener: &Rc<dyn ChangeListener>) {
        if !self.contains(listener) {
            self.entries.push(Rc::downgrade(listener));
        }
    }

    fn remove(&mut self, listener: &Rc<dyn ChangeListener>) {
        let target = Rc::as_ptr(listener).cast::<()>();
        self.entries
            .retain(|entry| entry.as_ptr().cast::<()>() != target);
    }

    /// Prune dead entries and snapshot the live listeners.
    fn live(&mut self) -> Vec<Rc<dyn ChangeListener>> {
        self.entries.retain(|entry| entry.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}

/// Deliver `event` to every live listener, in registration order.
///
/// The set's borrow is released before any listener runs, so listeners may
/// re-entrantly register or unregister; the in-flight pass works from the
/// snapshot and is unaffected. A panicking listener propagates and aborts
/// delivery to the listeners after it.
fn fan_out(listeners: &RefCell<ListenerSet>, event: &ContainerChanged) {
    let live = listeners.borrow_mut().live();
    for listener in live {
        listener.container_changed(event);
    }
}

/// One field's change-callback registration.
///
/// Owns exactly one underlying subscription guard; dropping the
/// `FieldSubscription` is the unregistration.
struct FieldSubscription {
    _handle: WatchHandle,
}

impl FieldSubscription {
    /// Subscribe to `field` if it is observable. The callback builds a
    /// normalized event for `container` and fans it out to `listeners`.
    ///
    /// Returns `None` for non-observable fields.
    fn new(
        container: &Rc<dyn Container>,
        field: &Rc<dyn Field>,
        listeners: &Rc<RefCell<ListenerSet>>,
    ) -> Option<Self> {
        let observable = field.as_observable()?;
        let event_container = Rc::clone(container);
        let event_field = Rc::clone(field);
        let targets = Rc::clone(listeners);
        let handle = observable.subscribe(Rc::new(move || {
            let Ok(event) = ContainerChanged::new(
                Some(Rc::clone(&event_container)),
                Some(Rc::clone(&event_field)),
            ) else {
                return;
            };
            fan_out(&targets, &event);
        }));
        Some(Self { _handle: handle })
    }
}

/// Field subscriptions for one watched container.
struct ContainerWatch {
    container: Rc<dyn Container>,
    listeners: Rc<RefCell<ListenerSet>>,
    watched: HashMap<FieldId, FieldSubscription>,
}

impl ContainerWatch {
    fn new(container: Rc<dyn Container>, listeners: Rc<RefCell<ListenerSet>>) -> Self {
        Self {
            container,
            listeners,
            watched: HashMap::new(),
        }
    }

    fn watch_all(&mut self) {
        for id in self.container.field_ids() {
            self.watch_field(&id);
        }
    }

    /// Watch one field by id. Unknown ids and non-observable fields are
    /// skipped silently and never recorded, so a later unwatch of them is
    /// a no-op.
    fn watch_field(&mut self, id: &str) {
        if self.watched.contains_key(id) {
            return;
        }
        let Some(field) = self.container.field(id) else {
            trace!(field = id, "no such field, skipping");
            return;
        };
        match FieldSubscription::new(&self.container, &field, &self.listeners) {
            Some(subscription) => {
                trace!(field = id, "watching field");
                self.watched.insert(id.to_owned(), subscription);
            }
            None => trace!(field = id, "field not observable, skipping"),
        }
    }

    fn unwatch_all(&mut self) {
        // Snapshot the ids first: unwatching mutates the watched set.
        let ids: Vec<FieldId> = self.watched.keys().cloned().collect();
        for id in ids {
            self.unwatch_field(&id);
        }
    }

    fn unwatch_field(&mut self, id: &str) {
        if self.watched.remove(id).is_some() {
            trace!(field = id, "unwatched field");
        }
    }

    fn active_subscriptions(&self) -> usize {
        self.watched.len()
    }
}

/// Watches containers and fans field-level changes out to registered
/// listeners as [`ContainerChanged`] events.
///
/// See the [crate docs](crate) for the full control flow. All methods take
/// `&self`; the relay can be shared behind an `Rc` and driven from listener
/// callbacks (registration changes made during a delivery pass take effect
/// from the next pass).
#[derive(Default)]
pub struct Relay {
    listeners: Rc<RefCell<ListenerSet>>,
    watches: RefCell<HashMap<ContainerKey, ContainerWatch>>,
}

impl Relay {
    /// Create a relay with no listeners and no watched containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for change events. Adding an already-registered
    /// listener is a no-op; delivery order is first-registration order.
    ///
    /// The relay keeps only a weak reference: dropping the caller's last
    /// `Rc` deactivates the listener.
    pub fn add_listener(&self, listener: &Rc<dyn ChangeListener>) {
        self.listeners.borrow_mut().add(listener);
    }

    /// Unregister `listener`; no-op when it was never registered.
    pub fn remove_listener(&self, listener: &Rc<dyn ChangeListener>) {
        self.listeners.borrow_mut().remove(listener);
    }

    /// Number of live registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().live_count()
    }

    /// Watch every field of `container`, keyed by container identity.
    ///
    /// Fields without the observable capability are skipped silently; a
    /// container with zero observable fields is still recorded as watched.
    /// Watching an already-watched container is a no-op — no duplicate
    /// subscriptions, no duplicate deliveries.
    pub fn watch(&self, container: &Rc<dyn Container>) {
        let key = ContainerKey::of(container);
        if self.watches.borrow().contains_key(&key) {
            trace!("container already watched");
            return;
        }
        let mut watch = ContainerWatch::new(Rc::clone(container), Rc::clone(&self.listeners));
        watch.watch_all();
        debug!(fields = watch.active_subscriptions(), "watching container");
        self.watches.borrow_mut().insert(key, watch);
    }

    /// Stop watching `container`, releasing every underlying callback
    /// registration. No-op when the container is not watched.
    pub fn unwatch(&self, container: &Rc<dyn Container>) {
        let removed = self.watches.borrow_mut().remove(&ContainerKey::of(container));
        if let Some(mut watch) = removed {
            watch.unwatch_all();
            debug!("unwatched container");
        }
    }

    /// Watch a single field of an already-watched container. No-op when
    /// the container is not watched, the id is unknown, the field is not
    /// observable, or the field is already watched.
    pub fn watch_field(&self, container: &Rc<dyn Container>, id: &str) {
        if let Some(watch) = self.watches.borrow_mut().get_mut(&ContainerKey::of(container)) {
            watch.watch_field(id);
        }
    }

    /// Stop watching a single field of a watched container; its other
    /// fields stay watched. No-op when the container or field is not
    /// watched.
    pub fn unwatch_field(&self, container: &Rc<dyn Container>, id: &str) {
        if let Some(watch) = self.watches.borrow_mut().get_mut(&ContainerKey::of(container)) {
            watch.unwatch_field(id);
        }
    }

    /// Whether `container` is currently watched.
    #[must_use]
    pub fn is_watched(&self, container: &Rc<dyn Container>) -> bool {
        self.watches.borrow().contains_key(&ContainerKey::of(container))
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("listeners", &self.listeners.borrow().live_count())
            .field("watched_containers", &self.watches.borrow().len())
            .finish()
    }
}
