//! Movie model

use super::coerce::{self, WrongType};
use super::Violations;
use crate::storage::Document;
use crate::Identifier;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub const MIN_RELEASE_YEAR: i64 = 1800;
/// Releases may be announced this many years ahead
pub const FUTURE_YEARS: i64 = 5;
pub const MAX_DURATION_MINUTES: i64 = 600;
pub const MAX_RATING: f64 = 10.0;

// Persisted field names
const NAME: &str = "nome";
const GENRE: &str = "genero";
const RELEASE_YEAR: &str = "anolancemento";
const DIRECTOR: &str = "diretor";
const DURATION: &str = "duracao";
const RATING: &str = "avaliacao";
const POSTER: &str = "poster";

/// A validated movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "anolancemento")]
    pub release_year: i64,
    #[serde(rename = "diretor", default)]
    pub director: String,
    #[serde(rename = "duracao", default)]
    pub duration_minutes: i64,
    #[serde(rename = "avaliacao", default)]
    pub rating: f64,
    #[serde(rename = "sinopse", default)]
    pub synopsis: String,
    #[serde(rename = "poster", default)]
    pub poster_url: String,
}

/// A stored movie with its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "_id")]
    pub id: Identifier,
    #[serde(flatten)]
    pub movie: Movie,
}

/// Movie fields as a client sent them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieInput {
    #[serde(rename = "nome")]
    pub name: Option<Json>,
    #[serde(rename = "genero")]
    pub genre: Option<Json>,
    #[serde(rename = "anolancemento")]
    pub release_year: Option<Json>,
    #[serde(rename = "diretor")]
    pub director: Option<Json>,
    #[serde(rename = "duracao")]
    pub duration_minutes: Option<Json>,
    #[serde(rename = "avaliacao")]
    pub rating: Option<Json>,
    #[serde(rename = "sinopse")]
    pub synopsis: Option<Json>,
    #[serde(rename = "poster")]
    pub poster_url: Option<Json>,
}

/// Latest release year accepted today
pub fn max_release_year() -> i64 {
    i64::from(Utc::now().year()) + FUTURE_YEARS
}

impl MovieInput {
    /// Check every rule and build the normalized movie.
    ///
    /// Strings are trimmed, numbers may arrive as numeric strings and absent
    /// optional fields take their defaults.
    pub fn validate(&self) -> Result<Movie, Violations> {
        let mut violations = Violations::default();
        let max_year = max_release_year();

        let name = required_text(&mut violations, NAME, self.name.as_ref());
        let genre = required_text(&mut violations, GENRE, self.genre.as_ref());

        let release_year = match coerce::integer(self.release_year.as_ref()) {
            Ok(Some(year)) if (MIN_RELEASE_YEAR..=max_year).contains(&year) => year,
            _ => {
                violations.push(
                    RELEASE_YEAR,
                    format!(
                        "anolancemento is required and must be a year between {MIN_RELEASE_YEAR} and {max_year}"
                    ),
                );
                0
            }
        };

        let director = optional_text(&mut violations, DIRECTOR, self.director.as_ref());
        let synopsis = optional_text(&mut violations, "sinopse", self.synopsis.as_ref());
        let poster_url = optional_text(&mut violations, POSTER, self.poster_url.as_ref());

        let duration_minutes = match coerce::integer(self.duration_minutes.as_ref()) {
            Ok(None) => 0,
            Ok(Some(minutes)) if (0..=MAX_DURATION_MINUTES).contains(&minutes) => minutes,
            _ => {
                violations.push(
                    DURATION,
                    format!("duracao must be a whole number of minutes between 0 and {MAX_DURATION_MINUTES}"),
                );
                0
            }
        };

        let rating = match coerce::number(self.rating.as_ref()) {
            Ok(None) => 0.0,
            Ok(Some(rating)) if (0.0..=MAX_RATING).contains(&rating) => rating,
            _ => {
                violations.push(RATING, "avaliacao must be a number between 0 and 10");
                0.0
            }
        };

        violations.into_result(|| Movie {
            name,
            genre,
            release_year,
            director,
            duration_minutes,
            rating,
            synopsis,
            poster_url,
        })
    }
}

fn required_text(violations: &mut Violations, field: &'static str, value: Option<&Json>) -> String {
    match coerce::text(value) {
        Ok(Some(text)) => text,
        _ => {
            violations.push(field, format!("{field} is required and must be a non-empty string"));
            String::new()
        }
    }
}

fn optional_text(violations: &mut Violations, field: &'static str, value: Option<&Json>) -> String {
    match coerce::text(value) {
        Ok(text) => text.unwrap_or_default(),
        Err(WrongType) => {
            violations.push(field, format!("{field} must be a string"));
            String::new()
        }
    }
}

impl Movie {
    /// Persistence form; the synopsis becomes the markdown body
    pub fn to_document(&self, id: Identifier) -> Document {
        let mut doc = Document::new(id);
        doc.set(NAME, self.name.as_str())
            .set(GENRE, self.genre.as_str())
            .set(RELEASE_YEAR, self.release_year)
            .set(DIRECTOR, self.director.as_str())
            .set(DURATION, self.duration_minutes)
            .set(RATING, self.rating)
            .set(POSTER, self.poster_url.as_str());
        doc.with_body(self.synopsis.as_str())
    }
}

impl MovieRecord {
    /// Read a stored movie. Missing fields take their defaults.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id,
            movie: Movie {
                name: doc.get_str(NAME).unwrap_or_default().to_string(),
                genre: doc.get_str(GENRE).unwrap_or_default().to_string(),
                release_year: doc.get_i64(RELEASE_YEAR).unwrap_or_default(),
                director: doc.get_str(DIRECTOR).unwrap_or_default().to_string(),
                duration_minutes: doc.get_i64(DURATION).unwrap_or_default(),
                rating: doc.get_f64(RATING).unwrap_or_default(),
                synopsis: doc.body.clone(),
                poster_url: doc.get_str(POSTER).unwrap_or_default().to_string(),
            },
        }
    }
}
