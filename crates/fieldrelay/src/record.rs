//! Ordered field map, the bundled [`Container`] implementation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::contract::{Container, Field, FieldId};

/// A container backed by an insertion-ordered list of named fields.
///
/// Enumeration order is insertion order; replacing an existing field keeps
/// its position. Records compare by `Rc` identity once watched, like every
/// container.
#[derive(Default)]
pub struct Record {
    fields: RefCell<Vec<(FieldId, Rc<dyn Field>)>>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field` under `id`, replacing any existing field with that id
    /// (in place, preserving enumeration order).
    pub fn insert(&self, id: impl Into<FieldId>, field: Rc<dyn Field>) {
        let id = id.into();
        let mut fields = self.fields.borrow_mut();
        if let Some(slot) = fields.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = field;
        } else {
            fields.push((id, field));
        }
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }
}

impl Container for Record {
    fn field_ids(&self) -> Vec<FieldId> {
        self.fields.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    fn field(&self, id: &str) -> Option<Rc<dyn Field>> {
        self.fields
            .borrow()
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, field)| Rc::clone(field))
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("field_ids", &self.field_ids())
            .finish()
    }
}
