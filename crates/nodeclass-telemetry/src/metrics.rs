//! Prometheus-backed metrics registry.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters relevant to the classifier: requests, collection
//!   writes, resolutions and authentication failures.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::{Result, TelemetryError};

/// Result of a collection write, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The collection was persisted and published.
    Committed,
    /// The write was rejected or failed to persist.
    Failed,
}

impl WriteOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Failed => "failed",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    collection_writes_total: IntCounterVec,
    resolutions_total: IntCounterVec,
    auth_failures_total: IntCounter,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let collection_writes_total = counter_vec(
            "collection_writes_total",
            "Collection writes by collection and outcome",
            &["collection", "outcome"],
        )?;
        let resolutions_total = counter_vec(
            "resolutions_total",
            "Node classifications by matching source",
            &["source"],
        )?;
        let auth_failures_total = IntCounter::with_opts(Opts::new(
            "auth_failures_total",
            "Rejected authentication attempts",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "auth_failures_total",
            source,
        })?;

        register(&registry, "http_requests_total", http_requests_total.clone())?;
        register(
            &registry,
            "collection_writes_total",
            collection_writes_total.clone(),
        )?;
        register(&registry, "resolutions_total", resolutions_total.clone())?;
        register(&registry, "auth_failures_total", auth_failures_total.clone())?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                collection_writes_total,
                resolutions_total,
                auth_failures_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        let code = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[route, code.as_str()])
            .inc();
    }

    /// Count a write against `collection`.
    pub fn inc_collection_write(&self, collection: &str, outcome: WriteOutcome) {
        self.inner
            .collection_writes_total
            .with_label_values(&[collection, outcome.as_str()])
            .inc();
    }

    /// Count a classification answered from `source` (`host`, `group`,
    /// `default` or `none`).
    pub fn inc_resolution(&self, source: &str) {
        self.inner
            .resolutions_total
            .with_label_values(&[source])
            .inc();
    }

    /// Count a rejected authentication attempt.
    pub fn inc_auth_failure(&self) {
        self.inner.auth_failures_total.inc();
    }

    /// Rejected authentication attempts so far.
    #[must_use]
    pub fn auth_failures(&self) -> u64 {
        self.inner.auth_failures_total.get()
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: C) -> Result<()>
where
    C: prometheus::core::Collector + 'static,
{
    registry
        .register(Box::new(collector))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
