//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::Request,
    middleware,
    routing::get,
};
use nodeclass_core::Classifier;
use nodeclass_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::auth::require_basic_auth;
use crate::http::groups::{create_group, delete_group, get_group, list_groups, update_group};
use crate::http::health::{healthz, metrics};
use crate::http::hosts::{create_host, delete_host, get_host, list_hosts, update_host};
use crate::http::telemetry::{assign_request_id, echo_request_id, request_id, track_request};
use crate::http::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::state::ApiState;

/// Axum router wrapper that hosts the classifier API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API around a shared classifier and metrics registry.
    #[must_use]
    pub fn new(classifier: Arc<Classifier>, telemetry: Metrics) -> Self {
        let state = Arc::new(ApiState::new(classifier, telemetry));
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let id = request_id(request.headers());

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(assign_request_id())
            .layer(echo_request_id())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_request,
            ));

        let router = Self::public_routes()
            .merge(Self::classifier_routes(&state))
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/metrics", get(metrics))
    }

    fn classifier_routes(state: &Arc<ApiState>) -> Router<Arc<ApiState>> {
        let require_auth = middleware::from_fn_with_state(state.clone(), require_basic_auth);

        Router::new()
            .route("/hosts", get(list_hosts).post(create_host))
            .route(
                "/hosts/{fqdn}",
                get(get_host).put(update_host).delete(delete_host),
            )
            .route("/groups", get(list_groups).post(create_group))
            .route(
                "/groups/{name}",
                get(get_group).put(update_group).delete(delete_group),
            )
            .route("/users", get(list_users).post(create_user))
            .route(
                "/users/{username}",
                get(get_user).put(update_user).delete(delete_user),
            )
            .route_layer(require_auth)
    }

    /// Consume the server and return the underlying router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve the API on `addr` until `shutdown` resolves, then drain
    /// in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "Starting API");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
