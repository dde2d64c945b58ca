//! Liveness and metrics endpoints. Neither requires authentication.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use tracing::error;

use crate::http::constants::CONTENT_TYPE_METRICS;
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn healthz() -> &'static str {
    "OK"
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_METRICS)
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use nodeclass_core::Classifier;
    use nodeclass_telemetry::Metrics;
    use nodeclass_test_support::MemoryBackend;

    #[tokio::test]
    async fn health_and_metrics_respond() -> Result<()> {
        assert_eq!(healthz().await, "OK");

        let classifier = Classifier::open(Arc::new(MemoryBackend::new())).await?;
        let telemetry = Metrics::new()?;
        telemetry.inc_auth_failure();
        let state = Arc::new(ApiState::new(Arc::new(classifier), telemetry));

        let response = metrics(State(state)).await.expect("metrics");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("auth_failures_total 1"));
        Ok(())
    }
}
