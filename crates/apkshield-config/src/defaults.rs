//! Default values applied when the environment leaves a setting unset.
//!
//! # Design
//! - Centralize the deployment defaults so loader and tests agree.
//! - Keep size/time ceilings explicit for auditability.

/// Default bind address for the HTTP listener.
pub(crate) const BIND_ADDR: &str = "0.0.0.0";
/// Default HTTP port when neither `APKSHIELD_HTTP_PORT` nor `PORT` is set.
pub(crate) const HTTP_PORT: u16 = 5000;
/// Default upload ceiling: 150 MiB.
pub(crate) const MAX_UPLOAD_BYTES: u64 = 150 * 1024 * 1024;
/// Default wall-clock ceiling for one tool invocation, in seconds.
pub(crate) const TOOL_TIMEOUT_SECS: u64 = 300;
/// Default scratch directory for per-job workspaces.
pub(crate) const SCRATCH_DIR: &str = "/tmp";
/// Default location of the protection tool artifact.
pub(crate) const TOOL_JAR: &str = "executable/dpt.jar";
/// Launcher used when `APKSHIELD_JAVA_BIN` and `JAVA_HOME` are both unset.
pub(crate) const JAVA_BIN: &str = "java";
