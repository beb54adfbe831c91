#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the apkshield workspace.
//!
//! Centralises logging, metrics, and request-id middleware so the HTTP
//! surface and job runner adopt a consistent observability story.

pub mod error;
pub mod init;
pub mod metrics;
pub mod request_id;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
pub use request_id::{REQUEST_ID_HEADER, propagate_request_id_layer, set_request_id_layer};
