//! Comment controller

use super::movies::Deleted;
use super::{round1, Envelope};
use crate::models::comment::{self, CREATED_AT, MOVIE_ID};
use crate::models::{CommentInput, CommentPatch, CommentRecord};
use crate::query;
use crate::storage::{Collection, Document, Store};
use crate::{Error, Identifier, Result};
use catalog_query::{Accumulator, Aggregate, Field, Filter, Find, Sort};
use serde::Serialize;

const KIND: &str = "Comment";

#[derive(Debug, Clone, Serialize)]
pub struct CommentSaved {
    pub id: Identifier,
    #[serde(rename = "comentario")]
    pub comment: CommentRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommentStats {
    #[serde(rename = "totalComentarios")]
    pub total: usize,
    /// Mean rating over all the movie's comments, one decimal
    #[serde(rename = "mediaAvaliacao")]
    pub average_rating: f64,
}

#[derive(Debug, Clone)]
pub struct CommentController {
    store: Store,
    collection: String,
}

impl CommentController {
    pub fn new(store: Store, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn collection(&self) -> Result<Collection> {
        self.store.collection(&self.collection)
    }

    /// Add a comment. The movie it points at does not have to exist.
    pub async fn create(&self, input: &CommentInput) -> Result<Envelope<CommentSaved>> {
        let comment = input.validate(comment::now())?;
        let id = Identifier::generate();

        self.collection()?.insert(&comment.to_document(id)).await?;
        tracing::debug!(%id, movie_id = %comment.movie_id, "comment created");

        Ok(Envelope::ok(
            "Comment added successfully!",
            CommentSaved {
                id,
                comment: CommentRecord { id, comment },
            },
        ))
    }

    /// Comments on a movie, newest first
    pub async fn list_by_movie(&self, movie_id: &str) -> Result<Envelope<Vec<CommentRecord>>> {
        let movie_id = parse_id("movie", movie_id)?;

        let find = Find::new(for_movie(&movie_id)).sort(Sort::desc(Field::named(CREATED_AT)));
        let comments = query::find(&self.collection()?, &find)
            .await?
            .iter()
            .map(CommentRecord::from_document)
            .collect::<Result<Vec<_>>>()?;

        Ok(Envelope::ok(
            format!("{} comment(s) found", comments.len()),
            comments,
        ))
    }

    pub async fn get(&self, id: &str) -> Result<Envelope<CommentRecord>> {
        let id = parse_id("comment", id)?;
        let comment = CommentRecord::from_document(&self.find(&id).await?)?;
        Ok(Envelope::ok("Comment found", comment))
    }

    /// Change the text and/or rating and stamp the edit time
    pub async fn update(&self, id: &str, patch: &CommentPatch) -> Result<Envelope<CommentRecord>> {
        let id = parse_id("comment", id)?;
        let changes = patch.validate()?;

        let mut record = CommentRecord::from_document(&self.find(&id).await?)?;
        record.comment.apply(changes, comment::now());

        if !self
            .collection()?
            .replace(&record.comment.to_document(id))
            .await?
        {
            return Err(Error::not_found(KIND, id));
        }
        tracing::debug!(%id, "comment updated");

        Ok(Envelope::ok("Comment updated successfully!", record))
    }

    pub async fn delete(&self, id: &str) -> Result<Envelope<CommentSaved>> {
        let id = parse_id("comment", id)?;
        let comment = CommentRecord::from_document(&self.find(&id).await?)?;

        if !self.collection()?.delete(&id).await? {
            return Err(Error::not_found(KIND, id));
        }
        tracing::debug!(%id, "comment deleted");

        Ok(Envelope::ok(
            "Comment deleted successfully!",
            CommentSaved { id, comment },
        ))
    }

    pub async fn delete_all_for_movie(&self, movie_id: &str) -> Result<Envelope<Deleted>> {
        let movie_id = parse_id("movie", movie_id)?;
        let deleted_count = query::delete_where(&self.collection()?, &for_movie(&movie_id)).await?;
        tracing::debug!(%movie_id, deleted_count, "comments deleted for movie");

        Ok(Envelope::ok(
            format!("{deleted_count} comment(s) deleted"),
            Deleted { deleted_count },
        ))
    }

    pub async fn statistics_for_movie(&self, movie_id: &str) -> Result<Envelope<CommentStats>> {
        let movie_id = parse_id("movie", movie_id)?;

        let query = Aggregate::new(for_movie(&movie_id))
            .accumulate(Accumulator::count("total"))
            .accumulate(Accumulator::avg(Field::named("avaliacao"), "media"));
        let groups = query::aggregate(&self.collection()?, &query).await?;
        let group = groups.first();

        let stats = CommentStats {
            total: group
                .and_then(|g| g.get_i64("total"))
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or_default(),
            average_rating: group
                .and_then(|g| g.get_f64("media"))
                .map(round1)
                .unwrap_or(0.0),
        };

        Ok(Envelope::ok("Statistics retrieved", stats))
    }

    async fn find(&self, id: &Identifier) -> Result<Document> {
        self.collection()?
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(KIND, id))
    }
}

fn for_movie(movie_id: &Identifier) -> Filter {
    Filter::eq(Field::named(MOVIE_ID), movie_id.to_string())
}

fn parse_id(kind: &'static str, raw: &str) -> Result<Identifier> {
    Identifier::parse(raw).map_err(|_| Error::InvalidId {
        kind,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn controller(tmp: &TempDir) -> CommentController {
        let store = Store::connect(tmp.path().to_str().unwrap(), "catalogo")
            .await
            .unwrap();
        CommentController::new(store, "comentarios")
    }

    async fn add(comments: &CommentController, movie_id: &Identifier, rating: f64) -> Identifier {
        let input: CommentInput = serde_json::from_value(json!({
            "filmeId": movie_id.to_string(),
            "autor": "Ana",
            "texto": "Worth watching.",
            "avaliacao": rating
        }))
        .unwrap();
        comments.create(&input).await.unwrap().data.unwrap().id
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped_to_movie() {
        let tmp = TempDir::new().unwrap();
        let comments = controller(&tmp).await;
        let movie = Identifier::generate();

        let first = add(&comments, &movie, 6.0).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = add(&comments, &movie, 8.0).await;
        add(&comments, &Identifier::generate(), 1.0).await;

        let listed = comments.list_by_movie(&movie.to_string()).await.unwrap();
        assert_eq!(listed.message, "2 comment(s) found");
        let ids: Vec<_> = listed.data.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_update_stamps_edit_time() {
        let tmp = TempDir::new().unwrap();
        let comments = controller(&tmp).await;
        let id = add(&comments, &Identifier::generate(), 5.0).await;

        let patch: CommentPatch = serde_json::from_value(json!({"texto": "Changed my mind."})).unwrap();
        let updated = comments.update(&id.to_string(), &patch).await.unwrap().data.unwrap();
        assert_eq!(updated.comment.text, "Changed my mind.");
        assert_eq!(updated.comment.rating, 5.0);
        assert!(updated.comment.edited_at.is_some());

        let fetched = comments.get(&id.to_string()).await.unwrap().data.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_missing_comment() {
        let tmp = TempDir::new().unwrap();
        let comments = controller(&tmp).await;

        let patch: CommentPatch = serde_json::from_value(json!({"avaliacao": 3})).unwrap();
        let err = comments
            .update(&Identifier::generate().to_string(), &patch)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Comment not found");
    }

    #[tokio::test]
    async fn test_statistics_and_delete_all_for_movie() {
        let tmp = TempDir::new().unwrap();
        let comments = controller(&tmp).await;
        let movie = Identifier::generate();
        let other = Identifier::generate();

        add(&comments, &movie, 0.0).await;
        add(&comments, &movie, 7.0).await;
        add(&comments, &movie, 8.0).await;
        add(&comments, &other, 10.0).await;

        let stats = comments
            .statistics_for_movie(&movie.to_string())
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average_rating, 5.0);

        let deleted = comments
            .delete_all_for_movie(&movie.to_string())
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(deleted.deleted_count, 3);

        let stats = comments
            .statistics_for_movie(&movie.to_string())
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(stats, CommentStats { total: 0, average_rating: 0.0 });

        let remaining = comments.list_by_movie(&other.to_string()).await.unwrap();
        assert_eq!(remaining.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_movie_id() {
        let tmp = TempDir::new().unwrap();
        let comments = controller(&tmp).await;

        let err = comments.list_by_movie("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid movie ID");
        assert_eq!(err.status(), 400);
    }
}
