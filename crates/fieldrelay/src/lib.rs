#![forbid(unsafe_code)]

//! Change-notification relay for containers of named observable fields.
//!
//! A [`Relay`] watches a dynamic set of containers and re-emits any field
//! value change as a single uniform [`ContainerChanged`] event to every
//! registered [`ChangeListener`]. Callers subscribe once per container
//! instead of once per field, while still learning which field changed on
//! which container.
//!
//! # Architecture
//!
//! - [`contract`]: the capability traits the relay requires from its
//!   collaborators ([`Container`], [`Field`], [`ObservableField`],
//!   [`ChangeListener`]).
//! - [`event`]: the immutable [`ContainerChanged`] event and its
//!   construction error.
//! - [`relay`]: the [`Relay`] facade plus the per-container and per-field
//!   subscription bookkeeping.
//! - [`cell`] / [`record`]: ready-made collaborators — [`ObservableCell`]
//!   is a shared, version-tracked value with change notification;
//!   [`Record`] is an ordered field map.
//!
//! Everything is synchronous and single-threaded: a field mutation invokes
//! its change callbacks on the calling thread, the relay builds the event
//! and fans it out on that same thread, and control returns to the mutator
//! only after every listener has run. The types are `!Send`, so no
//! cross-thread sharing can compile.
//!
//! # Invariants
//!
//! 1. A (container, field-id) pair has at most one active subscription.
//! 2. A container is in the relay's watch map iff it has a live watch,
//!    even when none of its fields are observable.
//! 3. Listeners are notified in registration order; add/remove are
//!    idempotent set operations over listener identity.
//! 4. Unwatching (a field, or a whole container) drops every owned
//!    subscription guard, releasing the underlying registration on every
//!    removal path.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use fieldrelay::{ChangeListener, ContainerChanged, ObservableCell, Record, Relay};
//!
//! struct Printer;
//! impl ChangeListener for Printer {
//!     fn container_changed(&self, event: &ContainerChanged) {
//!         let _ = event; // react to the change
//!     }
//! }
//!
//! let name = ObservableCell::new(String::from("ada"));
//! let record = Record::new();
//! record.insert("name", Rc::new(name.clone()));
//! let record: Rc<dyn fieldrelay::Container> = Rc::new(record);
//!
//! let relay = Relay::new();
//! let printer: Rc<dyn ChangeListener> = Rc::new(Printer);
//! relay.add_listener(&printer);
//! relay.watch(&record);
//!
//! name.set(String::from("grace")); // Printer sees (record, name)
//! ```

pub mod cell;
pub mod contract;
pub mod event;
pub mod record;
pub mod relay;

pub use cell::ObservableCell;
pub use contract::{
    ChangeCallback, ChangeListener, Container, Field, FieldId, ObservableField, WatchHandle,
};
pub use event::{ContainerChanged, EventError};
pub use record::Record;
pub use relay::Relay;
