//! Abstract Syntax Tree for catalog queries

use serde::{Deserialize, Serialize};

/// A field reference inside a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// The document identifier
    Id,
    /// The markdown body
    Body,
    /// A named frontmatter field
    Named(String),
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Int(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

/// A predicate over documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Filter {
    /// Matches every document
    #[default]
    All,
    /// field = value
    Eq { field: Field, value: Literal },
    /// field > value (numeric or string ordering)
    Gt { field: Field, value: Literal },
    /// Substring match on a string field. `text` is literal, never a pattern.
    Contains {
        field: Field,
        text: String,
        case_insensitive: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(field: Field, value: impl Into<Literal>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn gt(field: Field, value: impl Into<Literal>) -> Self {
        Self::Gt {
            field,
            value: value.into(),
        }
    }

    /// Case-insensitive substring match
    pub fn icontains(field: Field, text: impl Into<String>) -> Self {
        Self::Contains {
            field,
            text: text.into(),
            case_insensitive: true,
        }
    }

    /// Conjunction that drops `All` terms and collapses single-term lists
    pub fn all_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut terms: Vec<Filter> = filters
            .into_iter()
            .filter(|f| !matches!(f, Filter::All))
            .collect();
        match terms.len() {
            0 => Filter::All,
            1 => terms.remove(0),
            _ => Filter::And(terms),
        }
    }

    /// Disjunction; an empty list matches nothing
    pub fn any_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut terms: Vec<Filter> = filters.into_iter().collect();
        match terms.len() {
            1 => terms.remove(0),
            _ => Filter::Or(terms),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub field: Field,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Sort {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// A find query: filter, ordering and skip/limit window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Find {
    pub filter: Filter,
    pub sort: Vec<Sort>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl Find {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Accumulator applied to each group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accumulator {
    /// Number of documents in the group
    Count { alias: String },
    /// Mean of a numeric field, ignoring documents without it
    Avg { field: Field, alias: String },
}

impl Accumulator {
    pub fn count(alias: impl Into<String>) -> Self {
        Self::Count {
            alias: alias.into(),
        }
    }

    pub fn avg(field: Field, alias: impl Into<String>) -> Self {
        Self::Avg {
            field,
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            Accumulator::Count { alias } | Accumulator::Avg { alias, .. } => alias,
        }
    }
}

/// Match then group. Without `group_by` every matching document falls into a single group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Aggregate {
    pub filter: Filter,
    pub group_by: Option<Field>,
    pub accumulators: Vec<Accumulator>,
}

impl Aggregate {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn group_by(mut self, field: Field) -> Self {
        self.group_by = Some(field);
        self
    }

    pub fn accumulate(mut self, acc: Accumulator) -> Self {
        self.accumulators.push(acc);
        self
    }
}
