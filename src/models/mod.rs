//! Domain models
//!
//! Each model has a loose input shape (what clients send), a validated
//! record (what gets stored) and the conversion to and from a [`Document`].
//!
//! [`Document`]: crate::storage::Document

pub mod comment;
mod coerce;
pub mod movie;

pub use comment::{Comment, CommentChanges, CommentInput, CommentPatch, CommentRecord};
pub use movie::{Movie, MovieInput, MovieRecord};

use serde::Serialize;
use std::fmt;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every rule an input broke, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(Violation::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// True if some rule on `field` failed
    pub fn touches(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// `Ok(value)` when nothing was violated
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&violation.message)?;
        }
        Ok(())
    }
}

impl From<Violations> for crate::Error {
    fn from(violations: Violations) -> Self {
        crate::Error::Validation(violations)
    }
}
