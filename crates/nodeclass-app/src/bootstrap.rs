use std::future::Future;
use std::sync::Arc;

use nodeclass_api::ApiServer;
use nodeclass_core::Classifier;
use nodeclass_data::YamlFileBackend;
use nodeclass_telemetry::{GlobalContextGuard, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

const BUILD_SHA: &str = match option_env!("NODECLASS_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Entry point for the classifier boot sequence: read the environment,
/// install logging and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// the collections cannot be loaded, or serving or the final flush fails.
pub async fn run_app() -> AppResult<()> {
    let config = AppConfig::from_env()?;
    nodeclass_telemetry::init_logging(&LoggingConfig {
        level: &config.log_level,
        format: config.log_format,
        build_sha: BUILD_SHA,
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("nodeclass-app");

    run_app_with(config, shutdown_signal()).await
}

/// Boot sequence over explicit settings; serves until `shutdown` resolves and
/// then flushes every collection.
///
/// # Errors
///
/// Returns an error if the collections cannot be loaded, metrics cannot be
/// registered, the listener fails, or the final flush fails.
pub async fn run_app_with<F>(config: AppConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        data_dir = %config.data_dir.display(),
        "node classifier bootstrap starting"
    );
    let backend = Arc::new(YamlFileBackend::new(config.data_dir.clone()));
    let classifier = Arc::new(
        Classifier::open(backend)
            .await
            .map_err(|err| AppError::classifier("classifier.open", err))?,
    );
    info!(
        hosts = classifier.list_hosts().len(),
        groups = classifier.list_groups().len(),
        users = classifier.list_users().len(),
        "collections loaded"
    );
    if classifier.list_users().is_empty() {
        warn!("no users are defined; every authenticated route will reject requests");
    }

    let telemetry =
        Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let api = ApiServer::new(Arc::clone(&classifier), telemetry);

    info!(addr = %config.bind_addr, "Launching API listener");
    let serve_result = api.serve(config.bind_addr, shutdown).await;

    let flush_result = classifier.shutdown().await;
    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    flush_result.map_err(|err| AppError::classifier("classifier.shutdown", err))?;
    info!("API server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
