//! Document representation
//!
//! A Document is a single markdown file with YAML frontmatter. The
//! frontmatter holds the record's structured fields and the body holds its
//! long-form text (a movie's synopsis, a comment's text).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Identifier;

/// A document in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier, also the file stem
    pub id: Identifier,

    /// YAML frontmatter fields
    pub fields: Fields,

    /// Markdown body content
    pub body: String,
}

/// Field values that can be stored in frontmatter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Frontmatter fields, kept in name order so rendered files are stable
pub type Fields = BTreeMap<String, Value>;

impl Document {
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            fields: Fields::new(),
            body: String::new(),
        }
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Set the body content
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Parse a document from markdown content
    pub fn parse(id: Identifier, content: &str) -> crate::Result<Self> {
        let (fields, body) = super::frontmatter::parse(content)?;
        Ok(Self { id, fields, body })
    }

    /// Render document back to markdown
    pub fn render(&self) -> crate::Result<String> {
        super::frontmatter::render(&self.fields, &self.body)
    }
}
