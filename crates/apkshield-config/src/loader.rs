//! Environment loading for [`AppConfig`].
//!
//! # Design
//! - Reads `APKSHIELD_*` variables with deployment defaults for everything
//!   except the values that have no sensible fallback.
//! - Pure `from_lookup` core so tests can inject an environment map instead
//!   of mutating process state.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, ToolConfig};
use crate::validate::validate_config;

/// Environment variable selecting the bind address.
pub const ENV_BIND_ADDR: &str = "APKSHIELD_BIND_ADDR";
/// Environment variable selecting the HTTP port.
pub const ENV_HTTP_PORT: &str = "APKSHIELD_HTTP_PORT";
/// Fallback port variable honoured for hosting platforms that inject `PORT`.
pub const ENV_PORT_FALLBACK: &str = "PORT";
/// Environment variable selecting the upload ceiling in bytes.
pub const ENV_MAX_UPLOAD_BYTES: &str = "APKSHIELD_MAX_UPLOAD_BYTES";
/// Environment variable selecting the tool timeout in seconds.
pub const ENV_TOOL_TIMEOUT_SECS: &str = "APKSHIELD_TOOL_TIMEOUT_SECS";
/// Environment variable selecting the scratch directory.
pub const ENV_SCRATCH_DIR: &str = "APKSHIELD_SCRATCH_DIR";
/// Environment variable selecting the tool jar path.
pub const ENV_TOOL_JAR: &str = "APKSHIELD_TOOL_JAR";
/// Environment variable selecting the Java launcher binary.
pub const ENV_JAVA_BIN: &str = "APKSHIELD_JAVA_BIN";
/// Environment variable pointing at an optional protect-config template.
pub const ENV_PROTECT_CONFIG: &str = "APKSHIELD_PROTECT_CONFIG";
/// Conventional JDK home variable used to derive the launcher path.
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";

impl AppConfig {
    /// Load and validate the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable holds a malformed value or the
    /// assembled configuration fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Assemble the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a value fails to parse or validation rejects the
    /// assembled configuration.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let bind_addr = parse_with(&lookup, ENV_BIND_ADDR, defaults::BIND_ADDR, |raw| {
            raw.parse::<IpAddr>()
                .map_err(|_| ConfigError::invalid("bind_addr", raw, "not_an_ip_address"))
        })?;

        let http_port = match lookup(ENV_HTTP_PORT).or_else(|| lookup(ENV_PORT_FALLBACK)) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("http_port", raw, "not_a_port"))?,
            None => defaults::HTTP_PORT,
        };

        let max_upload_bytes = parse_with(&lookup, ENV_MAX_UPLOAD_BYTES, "", |raw| {
            if raw.is_empty() {
                return Ok(defaults::MAX_UPLOAD_BYTES);
            }
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid("max_upload_bytes", raw, "not_an_integer"))
        })?;

        let timeout_secs = parse_with(&lookup, ENV_TOOL_TIMEOUT_SECS, "", |raw| {
            if raw.is_empty() {
                return Ok(defaults::TOOL_TIMEOUT_SECS);
            }
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid("tool_timeout_secs", raw, "not_an_integer"))
        })?;

        let scratch_dir = lookup(ENV_SCRATCH_DIR)
            .map_or_else(|| PathBuf::from(defaults::SCRATCH_DIR), PathBuf::from);
        let jar_path =
            lookup(ENV_TOOL_JAR).map_or_else(|| PathBuf::from(defaults::TOOL_JAR), PathBuf::from);
        let java_bin = resolve_java_bin(&lookup);
        let protect_config = lookup(ENV_PROTECT_CONFIG)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let config = Self {
            bind_addr,
            http_port,
            max_upload_bytes,
            tool: ToolConfig {
                jar_path,
                java_bin,
                scratch_dir,
                timeout: Duration::from_secs(timeout_secs),
                protect_config,
            },
        };
        validate_config(&config)?;
        Ok(config)
    }
}

/// Resolve the Java launcher: explicit override, then `$JAVA_HOME/bin/java`,
/// then a bare `java` found via `PATH`.
fn resolve_java_bin(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(explicit) = lookup(ENV_JAVA_BIN).filter(|raw| !raw.trim().is_empty()) {
        return PathBuf::from(explicit);
    }
    if let Some(home) = lookup(ENV_JAVA_HOME).filter(|raw| !raw.trim().is_empty()) {
        let candidate = PathBuf::from(home).join("bin").join("java");
        if candidate.exists() {
            return candidate;
        }
    }
    PathBuf::from(defaults::JAVA_BIN)
}

fn parse_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    fallback: &str,
    parse: impl FnOnce(&str) -> ConfigResult<T>,
) -> ConfigResult<T> {
    let raw = lookup(name).unwrap_or_else(|| fallback.to_string());
    parse(raw.trim())
}
