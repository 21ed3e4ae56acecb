//! Catalogo - movie and comment catalog
//!
//! A REST API over a file-backed document store, with a browser front end
//! served from the same process.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Catalogo                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────┐  ┌───────────────────────────┐ │
//! │  │   HTTP (axum)               │  │   CLI                     │ │
//! │  │   /api, index, static files │  │   serve, demo, shell      │ │
//! │  └──────────────┬──────────────┘  └─────────────┬─────────────┘ │
//! │                 │                               │               │
//! │                 ▼                               ▼               │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │                    Controllers                              ││
//! │  │  (validation, envelopes, pagination, statistics)            ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             │                                   │
//! │                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │                    Query Engine                             ││
//! │  │  (find, count, delete_where, aggregate)                     ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             │                                   │
//! │                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │                   Storage Layer                             ││
//! │  │  Store (connection) ─▶ Collection ─▶ Document               ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             │                                   │
//! │                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │              File System (Markdown Files)                   ││
//! │  │  /{database}/filmes/*.md   /{database}/comentarios/*.md     ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controllers;
pub mod demo;
pub mod error;
pub mod http;
pub mod id;
pub mod models;
pub mod query;
pub mod storage;
pub mod validation;

pub use error::{Error, Result};
pub use id::Identifier;

use config::StoreConfig;
use controllers::{CommentController, MovieController};
use storage::Store;

/// Everything a client of the catalog needs, wired to one store
#[derive(Debug, Clone)]
pub struct Catalog {
    pub store: Store,
    pub movies: MovieController,
    pub comments: CommentController,
}

impl Catalog {
    /// Connect to the store and prepare both collections
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let store = Store::connect(&config.store_url, &config.database).await?;
        Self::with_store(store, &config.movies_collection, &config.comments_collection).await
    }

    pub async fn with_store(store: Store, movies: &str, comments: &str) -> Result<Self> {
        // Fail early on bad collection names
        store.collection(movies)?.ensure_exists().await?;
        store.collection(comments)?.ensure_exists().await?;

        Ok(Self {
            movies: MovieController::new(store.clone(), movies),
            comments: CommentController::new(store.clone(), comments),
            store,
        })
    }

    pub fn close(&self) {
        self.store.close();
    }
}
