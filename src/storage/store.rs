//! Store - the connection to a document database
//!
//! A connection string names a root directory (`file:///var/lib/catalogo`,
//! `file://./data` or a bare path). Each database is a directory below the
//! root and each collection a directory below the database.
//!
//! The handle is created once by the composition root and cloned into
//! whatever needs persistence. Clones share one connection; closing any of
//! them closes all.

use super::collection::{Collection, WriteLock};
use crate::validation::{validate_collection_name, validate_database_name};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<RwLock<Option<Connection>>>,
}

#[derive(Debug)]
struct Connection {
    database_path: PathBuf,
    /// One write lock per collection name, shared by all its handles
    write_locks: Mutex<HashMap<String, WriteLock>>,
}

impl Store {
    /// Open the database `database` under the root named by `connection_string`
    pub async fn connect(connection_string: &str, database: &str) -> Result<Self> {
        let root = parse_connection_string(connection_string)?;
        validate_database_name(database)?;

        let database_path = root.join(database);
        fs::create_dir_all(&database_path).await.map_err(|e| {
            Error::Connection(format!("cannot open '{}': {e}", database_path.display()))
        })?;

        let metadata = fs::metadata(&database_path).await.map_err(|e| {
            Error::Connection(format!("cannot open '{}': {e}", database_path.display()))
        })?;
        if metadata.permissions().readonly() {
            return Err(Error::Connection(format!(
                "'{}' is read-only",
                database_path.display()
            )));
        }

        tracing::info!(path = %database_path.display(), "connected to document store");

        Ok(Self {
            inner: Arc::new(RwLock::new(Some(Connection {
                database_path,
                write_locks: Mutex::new(HashMap::new()),
            }))),
        })
    }

    /// Handle to a named collection
    pub fn collection(&self, name: &str) -> Result<Collection> {
        validate_collection_name(name)?;
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let connection = guard.as_ref().ok_or(Error::NotConnected)?;
        let writes = connection
            .write_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(Collection::with_lock(name, &connection.database_path, writes))
    }

    pub fn is_connected(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the connection. Calling it again is a no-op.
    pub fn close(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(connection) = guard.take() {
            tracing::info!(path = %connection.database_path.display(), "document store connection closed");
        }
    }

    /// Directory of the connected database
    pub fn database_path(&self) -> Result<PathBuf> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|c| c.database_path.clone())
            .ok_or(Error::NotConnected)
    }
}

fn parse_connection_string(connection_string: &str) -> Result<PathBuf> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(Error::Connection("connection string is not set".into()));
    }

    let path = match trimmed.split_once("://") {
        Some(("file", path)) => path,
        Some((scheme, _)) => {
            return Err(Error::Connection(format!(
                "unsupported connection scheme '{scheme}'"
            )))
        }
        None => trimmed.strip_prefix("file:").unwrap_or(trimmed),
    };

    if path.is_empty() {
        return Err(Error::Connection("connection string has no path".into()));
    }

    Ok(Path::new(path).to_path_buf())
}
