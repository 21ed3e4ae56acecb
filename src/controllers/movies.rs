//! Movie controller

use super::{non_blank, round1, Envelope, PageRequest, Pagination};
use crate::models::{MovieInput, MovieRecord};
use crate::query::{self, Group};
use crate::storage::{Collection, Store, Value};
use crate::{Error, Identifier, Result};
use catalog_query::{Accumulator, Aggregate, Field, Filter, Find, Sort};
use serde::Serialize;

const KIND: &str = "Movie";

/// Data of a create, update or delete
#[derive(Debug, Clone, Serialize)]
pub struct MovieSaved {
    pub id: Identifier,
    #[serde(rename = "filme")]
    pub movie: MovieRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted {
    #[serde(rename = "deletedCount")]
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    #[serde(rename = "genero")]
    pub genre: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieStats {
    pub total: usize,
    #[serde(rename = "porGenero")]
    pub by_genre: Vec<GenreCount>,
    /// Mean of the ratings above zero, one decimal
    #[serde(rename = "mediaAvaliacao")]
    pub average_rating: f64,
}

/// Listing options: text search over name, director and synopsis plus a
/// genre substring, both case-insensitive
#[derive(Debug, Clone, Default)]
pub struct MovieQuery {
    pub page: PageRequest,
    pub search: Option<String>,
    pub genre: Option<String>,
}

impl MovieQuery {
    fn filter(&self) -> Filter {
        let mut terms = Vec::new();

        if let Some(search) = non_blank(self.search.as_deref()) {
            terms.push(Filter::any_of([
                Filter::icontains(Field::named("nome"), search),
                Filter::icontains(Field::named("diretor"), search),
                Filter::icontains(Field::Body, search),
            ]));
        }
        if let Some(genre) = non_blank(self.genre.as_deref()) {
            terms.push(Filter::icontains(Field::named("genero"), genre));
        }

        Filter::all_of(terms)
    }
}

#[derive(Debug, Clone)]
pub struct MovieController {
    store: Store,
    collection: String,
}

impl MovieController {
    pub fn new(store: Store, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn collection(&self) -> Result<Collection> {
        self.store.collection(&self.collection)
    }

    pub async fn create(&self, input: &MovieInput) -> Result<Envelope<MovieSaved>> {
        let movie = input.validate()?;
        let id = Identifier::generate();

        self.collection()?.insert(&movie.to_document(id)).await?;
        tracing::debug!(%id, name = %movie.name, "movie created");

        Ok(Envelope::ok(
            "Movie created successfully!",
            MovieSaved {
                id,
                movie: MovieRecord { id, movie },
            },
        ))
    }

    /// One page of movies sorted by name
    pub async fn list(&self, query: &MovieQuery) -> Result<Envelope<Vec<MovieRecord>>> {
        let collection = self.collection()?;
        let filter = query.filter();

        let total = query::count(&collection, &filter).await?;
        let pagination = Pagination::new(query.page.page, query.page.limit, total);

        let find = Find::new(filter)
            .sort(Sort::asc(Field::named("nome")))
            .skip(pagination.offset())
            .limit(pagination.limit);
        let movies: Vec<_> = query::find(&collection, &find)
            .await?
            .iter()
            .map(MovieRecord::from_document)
            .collect();

        Ok(Envelope::ok(format!("{} movie(s) found", movies.len()), movies)
            .with_pagination(pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Envelope<MovieRecord>> {
        let id = parse_id(id)?;
        let movie = self.find(&id).await?;
        Ok(Envelope::ok("Movie found", movie))
    }

    pub async fn list_by_genre(&self, genre: &str) -> Result<Envelope<Vec<MovieRecord>>> {
        let find = Find::new(Filter::icontains(Field::named("genero"), genre))
            .sort(Sort::asc(Field::named("nome")));
        let movies: Vec<_> = query::find(&self.collection()?, &find)
            .await?
            .iter()
            .map(MovieRecord::from_document)
            .collect();

        Ok(Envelope::ok(
            format!("{} movie(s) found in genre \"{genre}\"", movies.len()),
            movies,
        ))
    }

    /// Replace every field of an existing movie
    pub async fn update(&self, id: &str, input: &MovieInput) -> Result<Envelope<MovieSaved>> {
        let id = parse_id(id)?;
        let movie = input.validate()?;

        if !self.collection()?.replace(&movie.to_document(id)).await? {
            return Err(Error::not_found(KIND, id));
        }
        tracing::debug!(%id, "movie updated");

        Ok(Envelope::ok(
            "Movie updated successfully!",
            MovieSaved {
                id,
                movie: MovieRecord { id, movie },
            },
        ))
    }

    /// Remove a movie, returning what it held. Its comments are left alone.
    pub async fn delete(&self, id: &str) -> Result<Envelope<MovieSaved>> {
        let id = parse_id(id)?;
        let movie = self.find(&id).await?;

        if !self.collection()?.delete(&id).await? {
            return Err(Error::not_found(KIND, id));
        }
        tracing::debug!(%id, "movie deleted");

        Ok(Envelope::ok(
            "Movie deleted successfully!",
            MovieSaved { id, movie },
        ))
    }

    pub async fn delete_all(&self) -> Result<Envelope<Deleted>> {
        let deleted_count = self.collection()?.delete_all().await?;
        tracing::info!(deleted_count, "all movies deleted");

        Ok(Envelope::ok(
            format!("{deleted_count} movie(s) deleted successfully!"),
            Deleted { deleted_count },
        ))
    }

    pub async fn statistics(&self) -> Result<Envelope<MovieStats>> {
        let collection = self.collection()?;
        let total = collection.count().await?;

        let per_genre = Aggregate::new(Filter::All)
            .group_by(Field::named("genero"))
            .accumulate(Accumulator::count("total"));
        let mut by_genre: Vec<GenreCount> = query::aggregate(&collection, &per_genre)
            .await?
            .into_iter()
            .map(|group| {
                let total = group_count(&group);
                let genre = match group.key {
                    Value::String(genre) => genre,
                    _ => String::new(),
                };
                GenreCount { genre, total }
            })
            .collect();
        by_genre.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.genre.cmp(&b.genre)));

        let rated = Aggregate::new(Filter::gt(Field::named("avaliacao"), 0i64))
            .accumulate(Accumulator::avg(Field::named("avaliacao"), "media"));
        let average_rating = query::aggregate(&collection, &rated)
            .await?
            .first()
            .and_then(|group| group.get_f64("media"))
            .map(round1)
            .unwrap_or(0.0);

        Ok(Envelope::ok(
            "Statistics retrieved",
            MovieStats {
                total,
                by_genre,
                average_rating,
            },
        ))
    }

    async fn find(&self, id: &Identifier) -> Result<MovieRecord> {
        self.collection()?
            .get(id)
            .await?
            .map(|doc| MovieRecord::from_document(&doc))
            .ok_or_else(|| Error::not_found(KIND, id))
    }
}

fn group_count(group: &Group) -> usize {
    group
        .get_i64("total")
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<Identifier> {
    Identifier::parse(raw).map_err(|_| Error::InvalidId {
        kind: "movie",
        value: raw.to_string(),
    })
}
