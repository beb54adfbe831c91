//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to the protect flow.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    protect_requests_total: IntCounterVec,
    rejected_uploads_total: IntCounterVec,
    jobs_inflight: IntGauge,
    tool_runtime_ms: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Jobs currently awaiting an external tool invocation.
    pub jobs_inflight: i64,
    /// Wall-clock runtime of the most recent tool invocation, in ms.
    pub tool_runtime_ms: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();

        let protect_requests_total = IntCounterVec::new(
            Opts::new(
                "protect_requests_total",
                "Protect requests handled by outcome",
            ),
            &["outcome"],
        )
        .map_err(|source| TelemetryError::CollectorRegister {
            collector: "protect_requests_total",
            source,
        })?;
        let rejected_uploads_total = IntCounterVec::new(
            Opts::new("rejected_uploads_total", "Uploads rejected by reason"),
            &["reason"],
        )
        .map_err(|source| TelemetryError::CollectorRegister {
            collector: "rejected_uploads_total",
            source,
        })?;
        let jobs_inflight = IntGauge::with_opts(Opts::new(
            "jobs_inflight",
            "Protection jobs currently executing",
        ))
        .map_err(|source| TelemetryError::CollectorRegister {
            collector: "jobs_inflight",
            source,
        })?;
        let tool_runtime_ms = IntGauge::with_opts(Opts::new(
            "tool_runtime_ms",
            "Runtime of the most recent tool invocation (ms)",
        ))
        .map_err(|source| TelemetryError::CollectorRegister {
            collector: "tool_runtime_ms",
            source,
        })?;

        for collector in [
            Box::new(protect_requests_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(rejected_uploads_total.clone()),
            Box::new(jobs_inflight.clone()),
            Box::new(tool_runtime_ms.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|source| TelemetryError::CollectorRegister {
                    collector: "registry",
                    source,
                })?;
        }

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                protect_requests_total,
                rejected_uploads_total,
                jobs_inflight,
                tool_runtime_ms,
            }),
        })
    }

    /// Count one protect request with its terminal outcome label.
    pub fn inc_protect_request(&self, outcome: &str) {
        self.inner
            .protect_requests_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one rejected upload with the validation reason label.
    pub fn inc_rejected_upload(&self, reason: &str) {
        self.inner
            .rejected_uploads_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Track the start of a job; paired with [`Metrics::job_finished`].
    pub fn job_started(&self) {
        self.inner.jobs_inflight.inc();
    }

    /// Track the end of a job regardless of outcome.
    pub fn job_finished(&self) {
        self.inner.jobs_inflight.dec();
    }

    /// Record the wall-clock runtime of a completed tool invocation.
    pub fn observe_tool_runtime(&self, elapsed: Duration) {
        let millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        self.inner.tool_runtime_ms.set(millis);
    }

    /// Snapshot the gauges surfaced through diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_inflight: self.inner.jobs_inflight.get(),
            tool_runtime_ms: self.inner.tool_runtime_ms.get(),
        }
    }

    /// Render the registry in Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::Encode { source })?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
