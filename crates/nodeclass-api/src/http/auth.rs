//! Authentication middleware for the HTTP layer.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose};
use nodeclass_core::{AccessPolicy, Operation, Principal};
use tracing::{debug, error, warn};

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Username and password pair carried by a Basic authorization header.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

/// Resolve Basic credentials into a [`Principal`] stored in the request
/// extensions for handlers to authorize against.
pub(crate) async fn require_basic_auth(
    State(state): State<Arc<ApiState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(credentials) = extract_credentials(req.headers()) else {
        state.telemetry.inc_auth_failure();
        return Err(ApiError::unauthorized("missing or malformed basic credentials"));
    };

    let classifier = Arc::clone(&state.classifier);
    let username = credentials.username.clone();
    let principal = tokio::task::spawn_blocking(move || {
        classifier.authenticate(&credentials.username, &credentials.password)
    })
    .await
    .map_err(|err| {
        error!(error = %err, "credential verification task failed");
        ApiError::internal("credential verification failed")
    })?;

    let Some(principal) = principal else {
        state.telemetry.inc_auth_failure();
        warn!(username = %username, "authentication rejected");
        return Err(ApiError::unauthorized("invalid username or password"));
    };

    debug!(username = %principal.username, "request authenticated");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Check `principal` against the access policy for `operation`.
pub(crate) fn authorize(
    principal: &Principal,
    operation: Operation,
    subject: Option<&str>,
) -> Result<(), ApiError> {
    AccessPolicy::authorize(operation, principal, subject).map_err(|err| {
        debug!(
            username = %principal.username,
            operation = %operation,
            "request forbidden"
        );
        ApiError::from(err)
    })
}

pub(crate) fn extract_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() {
        return None;
    }
    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
