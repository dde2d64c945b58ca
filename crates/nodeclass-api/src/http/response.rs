//! YAML response body.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use nodeclass_data::render_yaml;
use serde::Serialize;
use tracing::error;

use crate::http::constants::CONTENT_TYPE_YAML;
use crate::http::errors::ApiError;

/// Serialize the wrapped value as a `text/yaml` document.
#[derive(Debug)]
pub(crate) struct Yaml<T>(pub(crate) T);

impl<T: Serialize> IntoResponse for Yaml<T> {
    fn into_response(self) -> Response {
        match render_yaml(&self.0) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_YAML))],
                body,
            )
                .into_response(),
            Err(err) => {
                error!(error = %err, "failed to render response document");
                ApiError::internal("failed to render response document").into_response()
            }
        }
    }
}
