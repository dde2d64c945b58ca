//! HTTP surface modules (router, middleware, handlers).

/// Basic authentication middleware.
pub(crate) mod auth;
/// Shared constants and header names.
pub(crate) mod constants;
/// Problem response helpers and error types.
pub(crate) mod errors;
/// Repeated form-field access.
pub(crate) mod form;
/// Group handlers.
pub(crate) mod groups;
/// Health and metrics endpoints.
pub(crate) mod health;
/// Host handlers.
pub(crate) mod hosts;
/// YAML response body.
pub(crate) mod response;
/// Router construction and server host.
pub mod router;
/// Request id, span context and metrics middleware.
pub(crate) mod telemetry;
/// User handlers.
pub(crate) mod users;
