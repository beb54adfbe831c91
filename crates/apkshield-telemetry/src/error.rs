//! Error types for telemetry operations.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while wiring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the global tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInit {
        /// Human-readable detail from the subscriber builder.
        detail: String,
    },
    /// Registering a Prometheus collector failed.
    #[error("failed to register metrics collector")]
    CollectorRegister {
        /// Collector that failed registration.
        collector: &'static str,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// Encoding the metrics exposition failed.
    #[error("failed to encode metrics")]
    Encode {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_stay_constant() {
        let err = TelemetryError::SubscriberInit {
            detail: "already set".to_string(),
        };
        assert_eq!(err.to_string(), "failed to install tracing subscriber");
    }
}
