use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use nodeclass_app::{AppConfig, AppError, run_app_with};
use nodeclass_data::CollectionKind;
use nodeclass_telemetry::LogFormat;
use nodeclass_test_support::fixtures::{GROUPS_DOCUMENT, HOSTS_DOCUMENT, data_dir_with};

fn config_for(data_dir: PathBuf) -> AppConfig {
    AppConfig {
        data_dir,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_level: "info".to_string(),
        log_format: LogFormat::Pretty,
    }
}

#[tokio::test]
async fn shutdown_flushes_every_collection() -> Result<()> {
    let dir = data_dir_with(&[
        (CollectionKind::Hosts, HOSTS_DOCUMENT),
        (CollectionKind::Groups, GROUPS_DOCUMENT),
    ])?;

    run_app_with(config_for(dir.path().to_path_buf()), async {}).await?;

    let users = dir.path().join(CollectionKind::Users.file_name());
    assert!(users.exists(), "users document written on shutdown");
    let groups = fs::read_to_string(dir.path().join(CollectionKind::Groups.file_name()))?;
    let order: Vec<&str> = groups
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.starts_with('-'))
        .collect();
    assert_eq!(order, ["corp:", "web:", "default:"]);
    Ok(())
}

#[tokio::test]
async fn unreadable_data_dir_fails_startup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let not_a_dir = dir.path().join("plain-file");
    fs::write(&not_a_dir, "not a directory")?;

    let result = run_app_with(config_for(not_a_dir), async {}).await;
    assert!(matches!(
        result,
        Err(AppError::Classifier {
            operation: "classifier.open",
            ..
        })
    ));
    Ok(())
}
