//! `/api/comentarios` handlers

use super::response::{body, Reply};
use super::AppState;
use crate::controllers::comments::{CommentSaved, CommentStats};
use crate::controllers::movies::Deleted;
use crate::models::{CommentInput, CommentPatch, CommentRecord};
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CommentInput>, JsonRejection>,
) -> Result<Reply<CommentSaved>> {
    let input = body(payload)?;
    Ok(Reply::created(state.catalog.comments.create(&input).await?))
}

pub async fn list_by_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Reply<Vec<CommentRecord>>> {
    Ok(Reply::ok(state.catalog.comments.list_by_movie(&movie_id).await?))
}

pub async fn statistics(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Reply<CommentStats>> {
    Ok(Reply::ok(
        state.catalog.comments.statistics_for_movie(&movie_id).await?,
    ))
}

pub async fn delete_all_for_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Reply<Deleted>> {
    Ok(Reply::ok(
        state.catalog.comments.delete_all_for_movie(&movie_id).await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Reply<CommentRecord>> {
    Ok(Reply::ok(state.catalog.comments.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CommentPatch>, JsonRejection>,
) -> Result<Reply<CommentRecord>> {
    let patch = body(payload)?;
    Ok(Reply::ok(state.catalog.comments.update(&id, &patch).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Reply<CommentSaved>> {
    Ok(Reply::ok(state.catalog.comments.delete(&id).await?))
}
