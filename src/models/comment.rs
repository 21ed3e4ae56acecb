//! Comment model

use super::coerce::{self, WrongType};
use super::Violations;
use crate::storage::{Document, Value};
use crate::{Error, Identifier, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub const MAX_TEXT_LENGTH: usize = 1000;
pub const MAX_RATING: f64 = 10.0;

// Persisted field names
pub(crate) const MOVIE_ID: &str = "filmeId";
const AUTHOR: &str = "autor";
const TEXT: &str = "texto";
const RATING: &str = "avaliacao";
pub(crate) const CREATED_AT: &str = "dataCriacao";
const EDITED_AT: &str = "dataEdicao";

/// A validated comment on a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "filmeId")]
    pub movie_id: Identifier,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "avaliacao", default)]
    pub rating: f64,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "dataEdicao", default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

/// A stored comment with its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "_id")]
    pub id: Identifier,
    #[serde(flatten)]
    pub comment: Comment,
}

/// Comment fields as a client sent them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentInput {
    #[serde(rename = "filmeId")]
    pub movie_id: Option<Json>,
    #[serde(rename = "autor")]
    pub author: Option<Json>,
    #[serde(rename = "texto")]
    pub text: Option<Json>,
    #[serde(rename = "avaliacao")]
    pub rating: Option<Json>,
}

/// The editable part of a comment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(rename = "texto")]
    pub text: Option<Json>,
    #[serde(rename = "avaliacao")]
    pub rating: Option<Json>,
}

/// A validated patch; at least one side is set
#[derive(Debug, Clone, PartialEq)]
pub struct CommentChanges {
    pub text: Option<String>,
    pub rating: Option<f64>,
}

/// Current time at the precision timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl CommentInput {
    /// Check every rule and build the comment, created at `created_at`
    pub fn validate(&self, created_at: DateTime<Utc>) -> std::result::Result<Comment, Violations> {
        let mut violations = Violations::default();

        let movie_id = match coerce::text(self.movie_id.as_ref()) {
            Ok(Some(raw)) => match Identifier::parse(&raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    violations.push(MOVIE_ID, "filmeId must be a valid movie ID");
                    None
                }
            },
            _ => {
                violations.push(MOVIE_ID, "filmeId is required");
                None
            }
        };

        let author = match coerce::text(self.author.as_ref()) {
            Ok(Some(author)) => author,
            _ => {
                violations.push(AUTHOR, "autor is required");
                String::new()
            }
        };

        let text = match self.text.as_ref() {
            Some(value) => check_text(&mut violations, value),
            None => {
                violations.push(TEXT, "texto is required");
                String::new()
            }
        };

        let rating = check_rating(&mut violations, self.rating.as_ref()).unwrap_or(0.0);

        match movie_id {
            Some(movie_id) if violations.is_empty() => Ok(Comment {
                movie_id,
                author,
                text,
                rating,
                created_at,
                edited_at: None,
            }),
            _ => Err(violations),
        }
    }
}

impl CommentPatch {
    pub fn validate(&self) -> std::result::Result<CommentChanges, Violations> {
        let mut violations = Violations::default();

        let text = self.text.as_ref().and_then(|value| {
            if value.is_null() {
                return None;
            }
            Some(check_text(&mut violations, value))
        });
        let rating = check_rating(&mut violations, self.rating.as_ref());

        if text.is_none() && rating.is_none() && violations.is_empty() {
            violations.push(TEXT, "texto or avaliacao must be provided");
        }

        violations.into_result(|| CommentChanges { text, rating })
    }
}

/// Trimmed text; the length limit counts the characters as sent
fn check_text(violations: &mut Violations, value: &Json) -> String {
    match coerce::text(Some(value)) {
        Ok(Some(text)) => {
            let sent = value.as_str().map(|s| s.chars().count()).unwrap_or_default();
            if sent > MAX_TEXT_LENGTH {
                violations.push(TEXT, format!("texto must be at most {MAX_TEXT_LENGTH} characters"));
            }
            text
        }
        Ok(None) => {
            violations.push(TEXT, "texto is required");
            String::new()
        }
        Err(WrongType) => {
            violations.push(TEXT, "texto must be a string");
            String::new()
        }
    }
}

fn check_rating(violations: &mut Violations, value: Option<&Json>) -> Option<f64> {
    match coerce::number(value) {
        Ok(None) => None,
        Ok(Some(rating)) if (0.0..=MAX_RATING).contains(&rating) => Some(rating),
        _ => {
            violations.push(RATING, "avaliacao must be a number between 0 and 10");
            None
        }
    }
}

impl Comment {
    /// Persistence form; the text becomes the markdown body
    pub fn to_document(&self, id: Identifier) -> Document {
        let mut doc = Document::new(id);
        doc.set(MOVIE_ID, self.movie_id.to_string())
            .set(AUTHOR, self.author.as_str())
            .set(RATING, self.rating)
            .set(CREATED_AT, timestamp(&self.created_at))
            .set(EDITED_AT, self.edited_at.as_ref().map(timestamp));
        doc.with_body(self.text.as_str())
    }

    pub fn apply(&mut self, changes: CommentChanges, edited_at: DateTime<Utc>) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(rating) = changes.rating {
            self.rating = rating;
        }
        self.edited_at = Some(edited_at);
    }
}

impl CommentRecord {
    /// Read a stored comment. Missing optional fields take their defaults;
    /// a comment without a readable movie reference is an error.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let movie_id = doc
            .get_str(MOVIE_ID)
            .and_then(|raw| Identifier::parse(raw).ok())
            .ok_or_else(|| Error::Frontmatter(format!("comment {} has no valid filmeId", doc.id)))?;

        Ok(Self {
            id: doc.id,
            comment: Comment {
                movie_id,
                author: doc.get_str(AUTHOR).unwrap_or_default().to_string(),
                text: doc.body.clone(),
                rating: doc.get_f64(RATING).unwrap_or_default(),
                created_at: doc.get(CREATED_AT).and_then(parse_timestamp).unwrap_or_default(),
                edited_at: doc.get(EDITED_AT).and_then(parse_timestamp),
            },
        })
    }
}

/// RFC 3339 in UTC with microseconds; sorts lexically in time order
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
