//! Read-only environment probe for the health endpoint.
//!
//! # Design
//! - Pure probe with no side effects; every field independently degrades to a
//!   negative value instead of raising, so `/health` never fails.
//! - The Java probe runs under its own short deadline so a wedged launcher
//!   cannot stall health checks.

use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

use apkshield_config::ToolConfig;

/// Ceiling for the `java -version` probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Version string reported when the launcher cannot be reached.
const VERSION_NOT_FOUND: &str = "Not found";

/// Snapshot of the external-tool environment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    /// Fixed `ok` marker; the endpoint itself never degrades.
    pub status: &'static str,
    /// Whether the protection tool artifact exists on disk.
    pub dpt_jar_exists: bool,
    /// Whether the Java launcher answered the version probe.
    pub java_available: bool,
    /// First line of the launcher's version banner, or `Not found`.
    pub java_version: String,
}

/// Probes the tool artifact and Java launcher described by a [`ToolConfig`].
#[derive(Clone)]
pub struct HealthProbe {
    tool: ToolConfig,
}

impl HealthProbe {
    /// Build a probe over the given tool configuration.
    #[must_use]
    pub const fn new(tool: ToolConfig) -> Self {
        Self { tool }
    }

    /// Collect the current environment snapshot. Never fails; probes that
    /// cannot complete report their negative default.
    pub async fn report(&self) -> HealthReport {
        let dpt_jar_exists = self.tool.jar_path.is_file();
        let (java_available, java_version) = self.probe_java().await;
        HealthReport {
            status: "ok",
            dpt_jar_exists,
            java_available,
            java_version,
        }
    }

    async fn probe_java(&self) -> (bool, String) {
        let invocation = Command::new(&self.tool.java_bin)
            .arg("-version")
            .kill_on_drop(true)
            .output();
        match tokio::time::timeout(PROBE_TIMEOUT, invocation).await {
            Ok(Ok(output)) => {
                // `java -version` prints its banner on stderr.
                let banner = String::from_utf8_lossy(&output.stderr);
                let version = banner
                    .lines()
                    .next()
                    .filter(|line| !line.trim().is_empty())
                    .map_or_else(|| "Unknown".to_string(), str::to_string);
                (true, version)
            }
            Ok(Err(err)) => {
                debug!(launcher = %self.tool.java_bin.display(), error = %err, "java probe failed");
                (false, VERSION_NOT_FOUND.to_string())
            }
            Err(_) => {
                debug!(launcher = %self.tool.java_bin.display(), "java probe timed out");
                (false, VERSION_NOT_FOUND.to_string())
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tool(jar_path: PathBuf, java_bin: PathBuf) -> ToolConfig {
        ToolConfig {
            jar_path,
            java_bin,
            scratch_dir: PathBuf::from("/tmp"),
            timeout: Duration::from_secs(300),
            protect_config: None,
        }
    }

    fn write_launcher(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-java.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write launcher");
        let mut perms = std::fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[tokio::test]
    async fn missing_everything_reports_negative_defaults() {
        let probe = HealthProbe::new(tool(
            PathBuf::from("/nonexistent/dpt.jar"),
            PathBuf::from("/nonexistent/java"),
        ));
        let report = probe.report().await;
        assert_eq!(report.status, "ok");
        assert!(!report.dpt_jar_exists);
        assert!(!report.java_available);
        assert_eq!(report.java_version, "Not found");
    }

    #[tokio::test]
    async fn present_jar_and_launcher_report_positive() {
        let dir = TempDir::new().expect("tempdir");
        let jar = dir.path().join("dpt.jar");
        std::fs::write(&jar, b"stub").expect("write jar");
        let launcher = write_launcher(&dir, r#"echo 'openjdk version "21"' >&2"#);

        let probe = HealthProbe::new(tool(jar, launcher));
        let report = probe.report().await;
        assert!(report.dpt_jar_exists);
        assert!(report.java_available);
        assert_eq!(report.java_version, r#"openjdk version "21""#);
    }

    #[tokio::test]
    async fn repeated_probes_are_idempotent() {
        let probe = HealthProbe::new(tool(
            PathBuf::from("/nonexistent/dpt.jar"),
            PathBuf::from("/nonexistent/java"),
        ));
        let first = probe.report().await;
        let second = probe.report().await;
        assert_eq!(first, second);
    }
}
