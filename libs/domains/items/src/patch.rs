//! Partial-update clause builder.
//!
//! A patch body becomes an ordered list of column assignments covering
//! exactly the fields the caller sent, in the order they were sent. The
//! `updated_at` refresh is appended by the repository, not here.

use serde_json::Value;

use crate::coerce::{as_object, coerce_name, coerce_note, coerce_value, json_text};
use crate::error::{ItemError, ItemResult};
use crate::models::NewItem;

/// One `column = value` assignment of an update
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Name(String),
    Value(f64),
    Note(String),
}

impl Assignment {
    pub fn column(&self) -> &'static str {
        match self {
            Assignment::Name(_) => "name",
            Assignment::Value(_) => "value",
            Assignment::Note(_) => "note",
        }
    }
}

/// Ordered, non-empty set of assignments
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateClause {
    assignments: Vec<Assignment>,
}

impl UpdateClause {
    /// Fails when `assignments` is empty; a no-op update is not a valid request
    pub fn new(assignments: Vec<Assignment>) -> ItemResult<Self> {
        if assignments.is_empty() {
            return Err(ItemError::validation("no fields provided"));
        }
        Ok(Self { assignments })
    }

    /// Coerce the known fields of a JSON object in key order.
    ///
    /// Keys other than `name`, `value` and `note` are ignored.
    pub fn from_json(body: &Value) -> ItemResult<Self> {
        let obj = as_object(body)?;

        let mut assignments = Vec::with_capacity(3);
        for (key, raw) in obj {
            let assignment = match key.as_str() {
                "name" => Assignment::Name(coerce_name(json_text(Some(raw)).as_deref())?),
                "value" => Assignment::Value(coerce_value(json_text(Some(raw)).as_deref())?),
                "note" => Assignment::Note(coerce_note(json_text(Some(raw)).as_deref())),
                _ => continue,
            };
            assignments.push(assignment);
        }

        Self::new(assignments)
    }

    /// Every column, for a full replace
    pub fn replace_all(item: NewItem) -> Self {
        Self {
            assignments: vec![
                Assignment::Name(item.name),
                Assignment::Value(item.value),
                Assignment::Note(item.note),
            ],
        }
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(Assignment::column).collect()
    }

    /// New name, if this clause renames the item
    pub fn new_name(&self) -> Option<&str> {
        self.assignments.iter().find_map(|a| match a {
            Assignment::Name(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }
}
