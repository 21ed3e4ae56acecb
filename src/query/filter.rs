//! Filter evaluation
//!
//! A [`Filter`] is compiled once per query into a [`Matcher`] so substring
//! patterns are built a single time, then evaluated against each document.

use crate::storage::document::{Document, Value};
use crate::{Error, Result};
use catalog_query::{Field, Filter, Literal};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::cmp::Ordering;

/// A compiled filter
#[derive(Debug)]
pub struct Matcher {
    node: Node,
}

#[derive(Debug)]
enum Node {
    All,
    Eq { field: Field, value: Value },
    Gt { field: Field, value: Value },
    Contains { field: Field, pattern: Regex },
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
}

impl Matcher {
    pub fn compile(filter: &Filter) -> Result<Self> {
        Ok(Self {
            node: compile_node(filter)?,
        })
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Document) -> bool {
        evaluate(&self.node, doc)
    }
}

fn compile_node(filter: &Filter) -> Result<Node> {
    Ok(match filter {
        Filter::All => Node::All,
        Filter::Eq { field, value } => Node::Eq {
            field: field.clone(),
            value: literal_to_value(value),
        },
        Filter::Gt { field, value } => Node::Gt {
            field: field.clone(),
            value: literal_to_value(value),
        },
        Filter::Contains {
            field,
            text,
            case_insensitive,
        } => {
            // The search text is matched literally
            let pattern = RegexBuilder::new(&regex::escape(text))
                .case_insensitive(*case_insensitive)
                .build()
                .map_err(|e| Error::Other(format!("Invalid search text: {e}")))?;
            Node::Contains {
                field: field.clone(),
                pattern,
            }
        }
        Filter::And(terms) => Node::And(terms.iter().map(compile_node).collect::<Result<_>>()?),
        Filter::Or(terms) => Node::Or(terms.iter().map(compile_node).collect::<Result<_>>()?),
        Filter::Not(inner) => Node::Not(Box::new(compile_node(inner)?)),
    })
}

fn evaluate(node: &Node, doc: &Document) -> bool {
    match node {
        Node::All => true,
        Node::Eq { field, value } => {
            let actual = value_of(field, doc);
            values_equal(actual.as_deref(), value)
        }
        Node::Gt { field, value } => value_of(field, doc)
            .and_then(|actual| compare_values(&actual, value))
            .map(|o| o == Ordering::Greater)
            .unwrap_or(false),
        Node::Contains { field, pattern } => text_of(field, doc)
            .map(|text| pattern.is_match(&text))
            .unwrap_or(false),
        Node::And(terms) => terms.iter().all(|t| evaluate(t, doc)),
        Node::Or(terms) => terms.iter().any(|t| evaluate(t, doc)),
        Node::Not(inner) => !evaluate(inner, doc),
    }
}

/// Resolve a field reference to a value
pub fn value_of<'a>(field: &Field, doc: &'a Document) -> Option<Cow<'a, Value>> {
    match field {
        Field::Id => Some(Cow::Owned(Value::String(doc.id.to_string()))),
        Field::Body => Some(Cow::Owned(Value::String(doc.body.clone()))),
        Field::Named(name) => doc.get(name).map(Cow::Borrowed),
    }
}

/// Resolve a field reference to text; non-string fields have none
fn text_of<'a>(field: &Field, doc: &'a Document) -> Option<Cow<'a, str>> {
    match field {
        Field::Id => Some(Cow::Owned(doc.id.to_string())),
        Field::Body => Some(Cow::Borrowed(doc.body.as_str())),
        Field::Named(name) => doc.get_str(name).map(Cow::Borrowed),
    }
}

/// Missing fields equal null
fn values_equal(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(a), b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

/// Ordering between comparable values; numbers compare across int/float
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// Total order used for sorting: missing/null, then numbers, then strings
pub fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Int(_)) | Some(Value::Float(_)) => 1,
            Some(Value::String(_)) => 2,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) if rank(a) == rank(b) => {
            compare_values(x, y).unwrap_or(Ordering::Equal)
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

pub fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
    }
}
