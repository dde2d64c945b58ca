//! Per-request metrics and span context.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use nodeclass_telemetry::set_request_context;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::http::constants::HEADER_REQUEST_ID;
use crate::state::ApiState;

/// Assigns an `x-request-id` to requests that arrive without one.
pub(crate) fn assign_request_id() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Echoes the request's `x-request-id` onto the response.
pub(crate) fn echo_request_id() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

pub(crate) fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Tag the request span with its id and route template, then count the
/// response under that route and status code.
pub(crate) async fn track_request(
    State(state): State<Arc<ApiState>>,
    matched: Option<MatchedPath>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let route = matched.map_or_else(
        || req.uri().path().to_string(),
        |path| path.as_str().to_string(),
    );
    set_request_context(&Span::current(), request_id(req.headers()), route.as_str());
    let response = next.run(req).await;
    state
        .telemetry
        .inc_http_request(&route, response.status().as_u16());
    response
}
