//! In-memory collection backend that keeps rendered documents per collection.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use nodeclass_data::{
    Collection, CollectionBackend, CollectionKind, DataError, DataResult, parse_collection,
    render_yaml,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Backend storing each collection as a YAML string.
///
/// Writes for selected collections can be made to fail, which lets tests
/// check that failed persists never leak into committed state.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<CollectionKind, String>>,
    failing: Mutex<HashSet<CollectionKind>>,
    saves: Mutex<HashMap<CollectionKind, usize>>,
}

impl MemoryBackend {
    /// Empty backend: every collection loads empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the document for `kind`.
    #[must_use]
    pub fn with_document(self, kind: CollectionKind, document: impl Into<String>) -> Self {
        lock(&self.documents).insert(kind, document.into());
        self
    }

    /// Make subsequent saves of `kind` fail (or succeed again).
    pub fn fail_writes(&self, kind: CollectionKind, failing: bool) {
        let mut set = lock(&self.failing);
        if failing {
            set.insert(kind);
        } else {
            set.remove(&kind);
        }
    }

    /// Last document persisted (or seeded) for `kind`.
    #[must_use]
    pub fn document(&self, kind: CollectionKind) -> Option<String> {
        lock(&self.documents).get(&kind).cloned()
    }

    /// Number of successful saves of `kind`.
    #[must_use]
    pub fn save_count(&self, kind: CollectionKind) -> usize {
        lock(&self.saves).get(&kind).copied().unwrap_or_default()
    }
}

#[async_trait]
impl<V> CollectionBackend<V> for MemoryBackend
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self, kind: CollectionKind) -> DataResult<Collection<V>> {
        let document = self.document(kind).unwrap_or_default();
        parse_collection(&document).map_err(|source| DataError::Decode {
            collection: kind,
            path: PathBuf::from(location(kind)),
            source,
        })
    }

    async fn save(&self, kind: CollectionKind, collection: &Collection<V>) -> DataResult<()> {
        if lock(&self.failing).contains(&kind) {
            return Err(DataError::Write {
                collection: kind,
                operation: "write",
                path: PathBuf::from(location(kind)),
                source: io::Error::other("injected write failure"),
            });
        }
        let rendered = render_yaml(collection).map_err(|source| DataError::Encode {
            collection: kind,
            source,
        })?;
        lock(&self.documents).insert(kind, rendered);
        *lock(&self.saves).entry(kind).or_default() += 1;
        Ok(())
    }

    fn describe(&self, kind: CollectionKind) -> String {
        location(kind)
    }
}

fn location(kind: CollectionKind) -> String {
    format!("memory://{}", kind.file_name())
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
