//! The normalized change event delivered to listeners.

use std::fmt;
use std::rc::Rc;

use crate::contract::{Container, Field};

/// Failure to construct a [`ContainerChanged`] event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// No container was supplied.
    MissingContainer,
    /// No field was supplied.
    MissingField,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContainer => write!(f, "container changed event requires a container"),
            Self::MissingField => write!(f, "container changed event requires a field"),
        }
    }
}

impl std::error::Error for EventError {}

/// Uniform "something on this container changed" event.
///
/// Carries the container and the field that changed, by reference; the new
/// value is read from the field itself (`field().current_value()`). The
/// event is immutable after construction.
pub struct ContainerChanged {
    container: Rc<dyn Container>,
    field: Rc<dyn Field>,
}

impl ContainerChanged {
    /// Build an event from the changed container and field.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingContainer`] or [`EventError::MissingField`]
    /// when the corresponding part is `None`.
    pub fn new(
        container: Option<Rc<dyn Container>>,
        field: Option<Rc<dyn Field>>,
    ) -> Result<Self, EventError> {
        let container = container.ok_or(EventError::MissingContainer)?;
        let field = field.ok_or(EventError::MissingField)?;
        Ok(Self { container, field })
    }

    /// The container a field of which changed.
    #[must_use]
    pub fn container(&self) -> &Rc<dyn Container> {
        &self.container
    }

    /// The field that changed.
    #[must_use]
    pub fn field(&self) -> &Rc<dyn Field> {
        &self.field
    }

    /// Event source; alias for [`container`](Self::container).
    #[must_use]
    pub fn source(&self) -> &Rc<dyn Container> {
        &self.container
    }
}

impl fmt::Debug for ContainerChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerChanged")
            .field("container", &Rc::as_ptr(&self.container))
            .field("field", &Rc::as_ptr(&self.field))
            .finish()
    }
}
