//! Collection - a group of documents stored in a directory
//!
//! Each collection is a directory of markdown files named after the
//! document identifier:
//!
//! ```text
//! /data/catalogo/
//!   /filmes/
//!     2b1c5e0a-7d0e-4a55-9d5b-3f1a2c4e8b90.md
//!   /comentarios/
//!     9f0d6a7e-11aa-4c1e-8f35-0c2b7e4d1a66.md
//! ```

use super::document::Document;
use crate::{Error, Identifier, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use walkdir::WalkDir;

/// Serializes the writes to one collection directory
pub(crate) type WriteLock = Arc<Mutex<()>>;

/// A collection of documents
#[derive(Debug, Clone)]
pub struct Collection {
    /// Name of the collection (directory name)
    pub name: String,
    /// Path to the collection directory
    pub path: PathBuf,
    writes: WriteLock,
}

impl Collection {
    #[cfg(test)]
    pub(crate) fn open(name: impl Into<String>, database_path: &Path) -> Self {
        Self::with_lock(name, database_path, WriteLock::default())
    }

    /// Handle whose writes are serialized with every other handle sharing `writes`
    pub(crate) fn with_lock(name: impl Into<String>, database_path: &Path, writes: WriteLock) -> Self {
        let name = name.into();
        let path = database_path.join(&name);
        Self { name, path, writes }
    }

    /// Create the collection directory if it doesn't exist
    pub async fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|source| Error::FileWrite {
                path: self.path.clone(),
                source,
            })
    }

    /// List all documents in the collection
    pub async fn list(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        if !self.path.exists() {
            return Ok(documents);
        }

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().map(|e| e != "md").unwrap_or(true) {
                continue;
            }
            match self.read_document(path).await {
                Ok(Some(doc)) => documents.push(doc),
                // Removed between the scan and the read
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(collection = %self.name, path = %path.display(), "skipping unreadable document: {e}");
                }
            }
        }

        Ok(documents)
    }

    /// Read a single document by ID
    pub async fn get(&self, id: &Identifier) -> Result<Option<Document>> {
        self.read_document(&self.document_path(id)).await
    }

    /// Insert a new document
    pub async fn insert(&self, doc: &Document) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.ensure_exists().await?;
        let path = self.document_path(&doc.id);

        if path.exists() {
            return Err(Error::DuplicateId {
                collection: self.name.clone(),
                id: doc.id.to_string(),
            });
        }

        self.write_document(&path, doc).await
    }

    /// Replace an existing document. Returns false when there was nothing to replace.
    pub async fn replace(&self, doc: &Document) -> Result<bool> {
        // Held across the existence check and the rename so a concurrent
        // delete cannot be undone by this write
        let _guard = self.writes.lock().await;
        let path = self.document_path(&doc.id);

        if !path.exists() {
            return Ok(false);
        }

        self.write_document(&path, doc).await?;
        Ok(true)
    }

    /// Delete a document by ID. Returns false when it did not exist.
    pub async fn delete(&self, id: &Identifier) -> Result<bool> {
        let _guard = self.writes.lock().await;
        self.remove(id).await
    }

    /// Delete every document, returning how many were removed
    pub async fn delete_all(&self) -> Result<usize> {
        let _guard = self.writes.lock().await;
        let mut removed = 0;
        for doc in self.list().await? {
            if self.remove(&doc.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Count documents in the collection
    pub async fn count(&self) -> Result<usize> {
        let docs = self.list().await?;
        Ok(docs.len())
    }

    /// Unlink a document file; callers hold the write lock
    async fn remove(&self, id: &Identifier) -> Result<bool> {
        let path = self.document_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::FileWrite { path, source }),
        }
    }

    fn document_path(&self, id: &Identifier) -> PathBuf {
        self.path.join(format!("{id}.md"))
    }

    /// Write through a temporary file so readers never see a partial document
    async fn write_document(&self, path: &Path, doc: &Document) -> Result<()> {
        let content = doc.render()?;
        let tmp = self
            .path
            .join(format!(".{}.{}.tmp", doc.id, Identifier::generate()));

        fs::write(&tmp, content)
            .await
            .map_err(|source| Error::FileWrite {
                path: tmp.clone(),
                source,
            })?;

        if let Err(source) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(Error::FileWrite {
                path: path.to_path_buf(),
                source,
            });
        }

        Ok(())
    }

    /// Read a document from a path; `None` if the file does not exist
    async fn read_document(&self, path: &Path) -> Result<Option<Document>> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Other(format!("Invalid document path {}", path.display())))?;
        let id = Identifier::parse(stem)
            .map_err(|e| Error::Other(format!("Invalid document file name: {e}")))?;

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Document::parse(id, &content).map(Some)
    }
}
