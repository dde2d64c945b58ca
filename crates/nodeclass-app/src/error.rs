//! # Design
//!
//! - Centralize application-level errors for configuration, bootstrap and shutdown.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration values were invalid.
    #[error("invalid configuration")]
    InvalidConfig {
        /// Environment variable that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value.
        value: Option<String>,
    },
    /// Classifier operations failed.
    #[error("classifier operation failed")]
    Classifier {
        /// Operation identifier.
        operation: &'static str,
        /// Source classifier error.
        source: nodeclass_core::EncError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: nodeclass_api::ApiServerError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: nodeclass_telemetry::TelemetryError,
    },
}

impl AppError {
    pub(crate) const fn classifier(
        operation: &'static str,
        source: nodeclass_core::EncError,
    ) -> Self {
        Self::Classifier { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: nodeclass_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: nodeclass_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let classifier = AppError::classifier(
            "classifier.shutdown",
            nodeclass_core::EncError::MissingField { field: "data" },
        );
        assert!(matches!(classifier, AppError::Classifier { .. }));
        assert_eq!(classifier.to_string(), "classifier operation failed");
        assert!(classifier.source().is_some());

        let api = AppError::api_server(
            "api_server.serve",
            nodeclass_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));

        let telemetry = AppError::telemetry(
            "telemetry.init",
            nodeclass_telemetry::TelemetryError::UnknownLogFormat {
                value: "xml".to_string(),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));

        let invalid = AppError::InvalidConfig {
            field: "NODECLASS_BIND_ADDR",
            reason: "not_a_socket_address",
            value: Some("nowhere".to_string()),
        };
        assert_eq!(invalid.to_string(), "invalid configuration");
        assert!(invalid.source().is_none());
    }
}
