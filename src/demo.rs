//! Scripted walkthrough of the movie operations
//!
//! Creates a handful of movies, reads them back in every supported way,
//! updates one, deletes another and lists what is left.

use crate::controllers::movies::MovieQuery;
use crate::controllers::{MovieController, PageRequest, MAX_LIMIT};
use crate::models::{MovieInput, MovieRecord};
use crate::{Identifier, Result};
use serde_json::json;

/// One step of the walkthrough as it should be shown to a user
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub title: &'static str,
    pub success: bool,
    pub message: String,
    pub lines: Vec<String>,
}

impl Step {
    fn new(title: &'static str, success: bool, message: impl Into<String>) -> Self {
        Self {
            title,
            success,
            message: message.into(),
            lines: Vec::new(),
        }
    }

    fn with_movies<'a>(mut self, movies: impl IntoIterator<Item = &'a MovieRecord>) -> Self {
        self.lines.extend(movies.into_iter().map(summary));
        self
    }
}

pub fn sample_movies() -> Vec<MovieInput> {
    [
        ("The Batman", "ação", 2022),
        ("Spider-Man: No Way Home", "ação", 2021),
        ("Encanto", "animação", 2021),
        ("Duna", "ficção científica", 2021),
        ("Top Gun: Maverick", "ação", 2022),
    ]
    .into_iter()
    .map(|(nome, genero, ano)| MovieInput {
        name: Some(json!(nome)),
        genre: Some(json!(genero)),
        release_year: Some(json!(ano)),
        ..MovieInput::default()
    })
    .collect()
}

/// Run the walkthrough. Operation failures are reported as failed steps;
/// only store failures abort.
pub async fn run(movies: &MovieController) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut created: Vec<Identifier> = Vec::new();

    let mut create = Step::new("Creating movies", true, "");
    for input in sample_movies() {
        match movies.create(&input).await {
            Ok(envelope) => {
                if let Some(saved) = envelope.data {
                    create.lines.push(summary(&saved.movie));
                    created.push(saved.id);
                }
            }
            Err(e) if e.is_client_error() => {
                create.success = false;
                create.lines.push(e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    create.message = format!("{} movie(s) created", created.len());
    steps.push(create);

    steps.push(list_step(movies, "Listing all movies").await?);

    if let Some(first) = created.first() {
        let step = match movies.get(&first.to_string()).await {
            Ok(found) => Step::new("Fetching by ID", true, found.message).with_movies(&found.data),
            Err(e) if e.is_client_error() => Step::new("Fetching by ID", false, e.to_string()),
            Err(e) => return Err(e),
        };
        steps.push(step);
    }

    let by_genre = movies.list_by_genre("ação").await?;
    steps.push(
        Step::new("Fetching by genre", true, by_genre.message)
            .with_movies(by_genre.data.iter().flatten()),
    );

    if let Some(first) = created.first() {
        let update = MovieInput {
            name: Some(json!("The Batman - Special Edition")),
            genre: Some(json!("ação")),
            release_year: Some(json!(2023)),
            ..MovieInput::default()
        };
        let step = match movies.update(&first.to_string(), &update).await {
            Ok(updated) => Step::new("Updating a movie", true, updated.message)
                .with_movies(updated.data.as_ref().map(|saved| &saved.movie)),
            Err(e) if e.is_client_error() => Step::new("Updating a movie", false, e.to_string()),
            Err(e) => return Err(e),
        };
        steps.push(step);
    }

    if let Some(second) = created.get(1) {
        let step = match movies.delete(&second.to_string()).await {
            Ok(deleted) => Step::new("Deleting a movie", true, deleted.message)
                .with_movies(deleted.data.as_ref().map(|saved| &saved.movie)),
            Err(e) if e.is_client_error() => Step::new("Deleting a movie", false, e.to_string()),
            Err(e) => return Err(e),
        };
        steps.push(step);
    }

    steps.push(list_step(movies, "Remaining movies").await?);

    Ok(steps)
}

async fn list_step(movies: &MovieController, title: &'static str) -> Result<Step> {
    let query = MovieQuery {
        page: PageRequest {
            page: 1,
            limit: MAX_LIMIT,
        },
        ..MovieQuery::default()
    };
    let listed = movies.list(&query).await?;
    let total = listed.pagination.map(|p| p.total).unwrap_or_default();

    Ok(Step::new(title, true, format!("{total} movie(s) in the catalog"))
        .with_movies(listed.data.iter().flatten()))
}

/// `Name (genre, year)`
pub fn summary(record: &MovieRecord) -> String {
    let movie = &record.movie;
    format!("{} ({}, {})", movie.name, movie.genre, movie.release_year)
}
