//! In-memory collection snapshots with serialized, persist-before-publish writers.
//!
//! # Design
//! - Readers clone an `Arc` of the last committed map and never wait on writers.
//! - Writers queue on a fair async mutex, edit a private copy, persist the copy
//!   through the backend and only then publish it. A failed save leaves the
//!   committed snapshot untouched, so memory never runs ahead of disk.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::backend::CollectionBackend;
use crate::collection::{Collection, CollectionKind};
use crate::error::{DataError, Result};

/// One persisted collection (hosts, groups or users).
pub struct CollectionStore<V> {
    kind: CollectionKind,
    backend: Arc<dyn CollectionBackend<V>>,
    committed: RwLock<Arc<Collection<V>>>,
    writer: Mutex<()>,
}

impl<V> CollectionStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Load the collection from `backend` and wrap it in a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted document cannot be read or decoded.
    pub async fn open(kind: CollectionKind, backend: Arc<dyn CollectionBackend<V>>) -> Result<Self> {
        let loaded = backend.load(kind).await?;
        info!(
            collection = %kind,
            records = loaded.len(),
            location = %backend.describe(kind),
            "collection loaded"
        );
        Ok(Self {
            kind,
            backend,
            committed: RwLock::new(Arc::new(loaded)),
            writer: Mutex::new(()),
        })
    }

    /// Collection identity.
    #[must_use]
    pub const fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Last committed state of the collection.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Collection<V>> {
        Arc::clone(
            &self
                .committed
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Committed record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        self.snapshot().get(key).cloned()
    }

    /// Whether a record is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.snapshot().contains_key(key)
    }

    /// Record keys in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }

    /// Number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Insert or replace the record under `key` and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted; the committed
    /// state is unchanged in that case.
    pub async fn put(&self, key: impl Into<String> + Send, value: V) -> Result<()> {
        let key = key.into();
        self.mutate(move |records| {
            records.insert(key, value);
            Ok::<_, DataError>(())
        })
        .await
    }

    /// Remove the record under `key` and persist the collection.
    ///
    /// Returns the removed record, or `None` (without writing) when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted; the committed
    /// state is unchanged in that case.
    pub async fn delete(&self, key: &str) -> Result<Option<V>> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.mutate(|records| Ok::<_, DataError>(records.shift_remove(key)))
            .await
    }

    /// Apply `edit` to a copy of the committed collection under the writer
    /// lock, persist the copy and publish it.
    ///
    /// When `edit` fails nothing is written and its error is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns the edit's error, or the persistence error converted into `E`.
    pub async fn mutate<T, E, F>(&self, edit: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Collection<V>) -> std::result::Result<T, E>,
        E: From<DataError>,
    {
        let _writer = self.writer.lock().await;
        let mut next = (*self.snapshot()).clone();
        let output = edit(&mut next)?;
        if let Err(err) = self.backend.save(self.kind, &next).await {
            warn!(collection = %self.kind, error = %err, "collection write failed; keeping previous state");
            return Err(err.into());
        }
        self.publish(next);
        Ok(output)
    }

    /// Re-persist the committed collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    pub async fn flush(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot();
        self.backend.save(self.kind, &current).await?;
        info!(collection = %self.kind, records = current.len(), "collection flushed");
        Ok(())
    }

    fn publish(&self, next: Collection<V>) {
        *self
            .committed
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingBackend {
        fail: AtomicBool,
        saves: AtomicUsize,
        last: std::sync::Mutex<Option<Collection<String>>>,
    }

    #[async_trait]
    impl CollectionBackend<String> for RecordingBackend {
        async fn load(&self, _kind: CollectionKind) -> Result<Collection<String>> {
            let mut seeded = Collection::new();
            seeded.insert("seed".to_string(), "value".to_string());
            Ok(seeded)
        }

        async fn save(&self, kind: CollectionKind, collection: &Collection<String>) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DataError::Write {
                    collection: kind,
                    operation: "write",
                    path: PathBuf::from("memory"),
                    source: io::Error::other("injected failure"),
                });
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some(collection.clone());
            Ok(())
        }

        fn describe(&self, _kind: CollectionKind) -> String {
            "memory".to_string()
        }
    }

    async fn store() -> (Arc<RecordingBackend>, CollectionStore<String>) {
        let backend = Arc::new(RecordingBackend::default());
        let store = CollectionStore::open(CollectionKind::Hosts, backend.clone())
            .await
            .expect("open");
        (backend, store)
    }

    #[tokio::test]
    async fn put_then_get_round_trips_and_persists_whole_collection() {
        let (backend, store) = store().await;
        store
            .put("web01.example.com", "web".to_string())
            .await
            .expect("put");

        assert_eq!(store.get("web01.example.com").as_deref(), Some("web"));
        assert_eq!(store.list(), ["seed", "web01.example.com"]);
        let persisted = backend.last.lock().expect("lock").clone().expect("saved");
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn failed_save_leaves_committed_state_untouched() {
        let (backend, store) = store().await;
        backend.fail.store(true, Ordering::SeqCst);

        let err = store
            .put("db01.example.com", "db".to_string())
            .await
            .expect_err("save should fail");
        assert!(matches!(err, DataError::Write { .. }));
        assert!(!store.contains("db01.example.com"));
        assert_eq!(store.list(), ["seed"]);

        let err = store.delete("seed").await.expect_err("delete should fail");
        assert_eq!(err.collection(), CollectionKind::Hosts);
        assert!(store.contains("seed"));
    }

    #[tokio::test]
    async fn delete_of_absent_key_does_not_write() {
        let (backend, store) = store().await;
        assert!(store.delete("missing").await.expect("delete").is_none());
        assert_eq!(backend.saves.load(Ordering::SeqCst), 0);

        let removed = store.delete("seed").await.expect("delete");
        assert_eq!(removed.as_deref(), Some("value"));
        assert!(store.is_empty());
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_edit_skips_persistence() {
        let (backend, store) = store().await;
        let result: std::result::Result<(), DataError> = store
            .mutate(|records| {
                records.clear();
                Err(DataError::Write {
                    collection: CollectionKind::Hosts,
                    operation: "edit",
                    path: PathBuf::from("memory"),
                    source: io::Error::other("rejected"),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(backend.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_writers_are_serialized() {
        let (_backend, store) = store().await;
        let store = Arc::new(store);
        let mut tasks = Vec::new();
        for index in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .mutate(|records| {
                        let count = records.len();
                        records.insert(format!("host{index}"), count.to_string());
                        Ok::<_, DataError>(())
                    })
                    .await
            }));
        }
        for task in tasks {
            task.await.expect("join").expect("mutate");
        }
        assert_eq!(store.len(), 17);
    }

    #[tokio::test]
    async fn snapshots_are_stable_across_writes() {
        let (_backend, store) = store().await;
        let before = store.snapshot();
        store.put("late", "entry".to_string()).await.expect("put");
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }
}
