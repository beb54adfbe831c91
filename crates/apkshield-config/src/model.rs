//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers shared by the loader, validator, and services.
//! - Everything the job runner needs about the external tool travels in one
//!   [`ToolConfig`] value so handlers never touch the environment directly.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Full service configuration assembled at bootstrap.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// IP address the HTTP listener binds to.
    pub bind_addr: IpAddr,
    /// TCP port the HTTP listener binds to.
    pub http_port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
    /// External tool invocation settings.
    pub tool: ToolConfig,
}

/// Settings describing how the external protection tool is invoked.
#[derive(Debug, Clone, Serialize)]
pub struct ToolConfig {
    /// Path to the protection tool jar.
    pub jar_path: PathBuf,
    /// Java launcher binary used to run the jar.
    pub java_bin: PathBuf,
    /// Root directory under which per-job scratch workspaces are created.
    pub scratch_dir: PathBuf,
    /// Wall-clock ceiling for one tool invocation.
    pub timeout: Duration,
    /// Optional protect-config template forwarded with `-c` when present.
    pub protect_config: Option<PathBuf>,
}

impl ToolConfig {
    /// Timeout ceiling in whole seconds, for logging and error reporting.
    #[must_use]
    pub const fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}
