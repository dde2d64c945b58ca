use std::sync::Arc;

use nodeclass_data::{CollectionBackend, CollectionKind, CollectionStore, DataError, YamlFileBackend};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Record {
    environment: Option<String>,
    tags: Vec<String>,
}

fn record(environment: Option<&str>, tags: &[&str]) -> Record {
    Record {
        environment: environment.map(str::to_string),
        tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
    }
}

async fn open(dir: &std::path::Path) -> CollectionStore<Record> {
    let backend: Arc<dyn CollectionBackend<Record>> = Arc::new(YamlFileBackend::new(dir));
    CollectionStore::open(CollectionKind::Hosts, backend)
        .await
        .expect("open store")
}

#[tokio::test]
async fn missing_document_opens_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = open(&dir.path().join("absent")).await;
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn writes_survive_reopen_in_insertion_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = open(dir.path()).await;
    store
        .put("zz.example.com", record(Some("production"), &["a"]))
        .await?;
    store.put("aa.example.com", record(None, &[])).await?;
    store.put("mm.example.com", record(None, &["b", "c"])).await?;
    drop(store);

    let reopened = open(dir.path()).await;
    assert_eq!(
        reopened.list(),
        ["zz.example.com", "aa.example.com", "mm.example.com"]
    );
    assert_eq!(
        reopened.get("mm.example.com"),
        Some(record(None, &["b", "c"]))
    );
    assert_eq!(reopened.get("aa.example.com"), Some(record(None, &[])));
    Ok(())
}

#[tokio::test]
async fn persisted_document_blanks_nulls_and_leaves_no_staging_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = open(dir.path()).await;
    store.put("web01", record(None, &["x"])).await?;

    let text = std::fs::read_to_string(dir.path().join("hosts.yaml"))?;
    assert!(text.contains("environment:\n"), "{text}");
    assert!(!text.contains("null"), "{text}");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
    Ok(())
}

#[tokio::test]
async fn delete_rewrites_document_without_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = open(dir.path()).await;
    store.put("keep", record(None, &[])).await?;
    store.put("drop", record(None, &[])).await?;
    store.delete("drop").await?;

    let reopened = open(dir.path()).await;
    assert_eq!(reopened.list(), ["keep"]);
    Ok(())
}

#[tokio::test]
async fn malformed_document_fails_to_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("hosts.yaml"), "- not\n- a mapping\n")?;
    let backend: Arc<dyn CollectionBackend<Record>> = Arc::new(YamlFileBackend::new(dir.path()));
    let Err(err) = CollectionStore::open(CollectionKind::Hosts, backend).await else {
        anyhow::bail!("expected decode failure");
    };
    assert!(matches!(err, DataError::Decode { .. }));
    Ok(())
}

#[tokio::test]
async fn unwritable_directory_surfaces_error_and_keeps_memory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data_dir = dir.path().join("data");
    let store = open(&data_dir).await;
    std::fs::write(&data_dir, "a file where the data directory should be")?;

    let err = store
        .put("web01", record(None, &[]))
        .await
        .expect_err("write should fail");
    assert!(matches!(err, DataError::Write { .. }));
    assert!(store.is_empty());
    Ok(())
}
