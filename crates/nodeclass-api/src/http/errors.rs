//! Problem-document API error wrapper.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use nodeclass_core::{EncError, ErrorKind};
use nodeclass_data::render_yaml;
use serde::Serialize;
use tracing::error;

use crate::http::constants::{
    AUTH_REALM_CHALLENGE, CONTENT_TYPE_YAML, PROBLEM_BAD_REQUEST, PROBLEM_FORBIDDEN,
    PROBLEM_INTERNAL, PROBLEM_NOT_FOUND, PROBLEM_UNAUTHORIZED,
};

/// Structured API error rendered as a YAML problem document.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProblemDocument<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    status: u16,
    detail: Option<&'a str>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            PROBLEM_UNAUTHORIZED,
            "authentication required",
        )
        .with_detail(detail)
    }

    pub(crate) fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, PROBLEM_FORBIDDEN, "forbidden").with_detail(detail)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            PROBLEM_NOT_FOUND,
            "resource not found",
        )
        .with_detail(detail)
    }
}

impl From<EncError> for ApiError {
    fn from(err: EncError) -> Self {
        let detail = err.detail();
        match err.kind() {
            ErrorKind::BadRequest => Self::bad_request(detail),
            ErrorKind::Forbidden => Self::forbidden(detail),
            ErrorKind::NotFound => Self::not_found(detail),
            ErrorKind::Internal => {
                error!(error = %err, detail = %detail, "classifier operation failed");
                Self::internal(detail)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let document = ProblemDocument {
            kind: self.kind,
            title: self.title,
            status: self.status.as_u16(),
            detail: self.detail.as_deref(),
        };
        let body = render_yaml(&document).unwrap_or_else(|err| {
            error!(error = %err, "failed to render problem document");
            format!("title: {}\n", self.title)
        });
        let mut response = (self.status, body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(CONTENT_TYPE_YAML),
        );
        if self.status == StatusCode::UNAUTHORIZED {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM_CHALLENGE),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeclass_data::{CollectionKind, DataError};
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn classifier_errors_map_to_statuses() {
        let missing: ApiError = EncError::MissingField { field: "fqdn" }.into();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.detail(), Some("field `fqdn` is required"));

        let absent: ApiError = EncError::NotFound {
            collection: CollectionKind::Groups,
            key: "web".into(),
        }
        .into();
        assert_eq!(absent.status, StatusCode::NOT_FOUND);
        assert_eq!(absent.kind, PROBLEM_NOT_FOUND);

        let denied: ApiError = EncError::Forbidden {
            operation: "delete_group",
            reason: "the default group cannot be deleted",
        }
        .into();
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let failed: ApiError = EncError::Persistence {
            source: DataError::Write {
                collection: CollectionKind::Hosts,
                operation: "rename",
                path: PathBuf::from("data/hosts.yaml"),
                source: io::Error::other("disk full"),
            },
        }
        .into();
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.detail(), Some("hosts could not be persisted"));
    }

    #[test]
    fn unauthorized_responses_carry_a_challenge() {
        let response = ApiError::unauthorized("missing credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static(AUTH_REALM_CHALLENGE))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static(CONTENT_TYPE_YAML))
        );
    }
}
