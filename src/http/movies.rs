//! `/api/filmes` handlers

use super::response::{body, Reply};
use super::AppState;
use crate::controllers::movies::{MovieQuery, MovieSaved, MovieStats};
use crate::controllers::PageRequest;
use crate::models::{MovieInput, MovieRecord};
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

/// Raw query string; bad numbers fall back to defaults instead of failing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub busca: Option<String>,
    pub genero: Option<String>,
}

impl From<ListParams> for MovieQuery {
    fn from(params: ListParams) -> Self {
        Self {
            page: PageRequest::parse(params.page.as_deref(), params.limit.as_deref()),
            search: params.busca,
            genre: params.genero,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Reply<Vec<MovieRecord>>> {
    let query = MovieQuery::from(params);
    Ok(Reply::ok(state.catalog.movies.list(&query).await?))
}

pub async fn statistics(State(state): State<AppState>) -> Result<Reply<MovieStats>> {
    Ok(Reply::ok(state.catalog.movies.statistics().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Reply<MovieRecord>> {
    Ok(Reply::ok(state.catalog.movies.get(&id).await?))
}

pub async fn by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> Result<Reply<Vec<MovieRecord>>> {
    Ok(Reply::ok(state.catalog.movies.list_by_genre(&genre).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MovieInput>, JsonRejection>,
) -> Result<Reply<MovieSaved>> {
    let input = body(payload)?;
    Ok(Reply::created(state.catalog.movies.create(&input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<MovieInput>, JsonRejection>,
) -> Result<Reply<MovieSaved>> {
    let input = body(payload)?;
    Ok(Reply::ok(state.catalog.movies.update(&id, &input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Reply<MovieSaved>> {
    Ok(Reply::ok(state.catalog.movies.delete(&id).await?))
}

