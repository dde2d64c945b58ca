//! Persistence backends for collection documents.
//!
//! # Design
//! - A backend loads a whole collection once and replaces it wholesale on save.
//! - The file backend never exposes a partially written document: it writes a
//!   sibling temporary file, syncs it, then renames it over the target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::collection::{Collection, CollectionKind};
use crate::document::{parse_collection, render_yaml};
use crate::error::{DataError, Result};

/// Storage collaborator that persists one collection as a single document.
#[async_trait]
pub trait CollectionBackend<V>: Send + Sync {
    /// Load the persisted collection. Missing state is an empty collection.
    async fn load(&self, kind: CollectionKind) -> Result<Collection<V>>;

    /// Durably replace the persisted collection with `collection`.
    async fn save(&self, kind: CollectionKind, collection: &Collection<V>) -> Result<()>;

    /// Human-readable location used in logs.
    fn describe(&self, kind: CollectionKind) -> String;
}

/// Backend that keeps each collection in `<dir>/<collection>.yaml`.
#[derive(Debug, Clone)]
pub struct YamlFileBackend {
    dir: PathBuf,
}

impl YamlFileBackend {
    /// Create a backend rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the collection documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document persisting `kind`.
    #[must_use]
    pub fn document_path(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn staging_path(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(format!(".{}.tmp", kind.file_name()))
    }

    async fn write_staged(kind: CollectionKind, staging: &Path, contents: &str) -> Result<()> {
        let staged_error = |operation: &'static str, source: std::io::Error| DataError::Write {
            collection: kind,
            operation,
            path: staging.to_path_buf(),
            source,
        };
        let mut file = fs::File::create(staging)
            .await
            .map_err(|err| staged_error("create", err))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|err| staged_error("write", err))?;
        file.sync_all()
            .await
            .map_err(|err| staged_error("sync", err))?;
        Ok(())
    }
}

#[async_trait]
impl<V> CollectionBackend<V> for YamlFileBackend
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self, kind: CollectionKind) -> Result<Collection<V>> {
        let path = self.document_path(kind);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(collection = %kind, path = %path.display(), "collection document missing; starting empty");
                return Ok(Collection::new());
            }
            Err(source) => {
                return Err(DataError::Read {
                    collection: kind,
                    path,
                    source,
                });
            }
        };
        parse_collection(&text).map_err(|source| DataError::Decode {
            collection: kind,
            path,
            source,
        })
    }

    async fn save(&self, kind: CollectionKind, collection: &Collection<V>) -> Result<()> {
        let contents = render_yaml(collection).map_err(|source| DataError::Encode {
            collection: kind,
            source,
        })?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DataError::Write {
                collection: kind,
                operation: "create_dir",
                path: self.dir.clone(),
                source,
            })?;

        let staging = self.staging_path(kind);
        let target = self.document_path(kind);
        if let Err(err) = Self::write_staged(kind, &staging, &contents).await {
            discard_staging(&staging).await;
            return Err(err);
        }
        if let Err(source) = fs::rename(&staging, &target).await {
            discard_staging(&staging).await;
            return Err(DataError::Write {
                collection: kind,
                operation: "rename",
                path: target,
                source,
            });
        }
        debug!(collection = %kind, path = %target.display(), records = collection.len(), "collection persisted");
        Ok(())
    }

    fn describe(&self, kind: CollectionKind) -> String {
        self.document_path(kind).display().to_string()
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(err) = fs::remove_file(staging).await
        && err.kind() != ErrorKind::NotFound
    {
        warn!(path = %staging.display(), error = %err, "failed to remove staging document");
    }
}
