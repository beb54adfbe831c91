//! Validation pass applied to an assembled [`AppConfig`].

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;

/// Upload ceilings above this are assumed to be misconfiguration (4 GiB).
const MAX_SANE_UPLOAD_BYTES: u64 = 4 * 1024 * 1024 * 1024;
/// Timeouts above this leave requests hanging far beyond any proxy budget.
const MAX_SANE_TIMEOUT_SECS: u64 = 3600;

/// Validate invariants the loader cannot express through parsing alone.
///
/// # Errors
///
/// Returns an error naming the first field that violates its constraint.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    if config.http_port == 0 {
        return Err(ConfigError::invalid("http_port", "0", "zero"));
    }
    if config.max_upload_bytes == 0 {
        return Err(ConfigError::invalid("max_upload_bytes", "0", "zero"));
    }
    if config.max_upload_bytes > MAX_SANE_UPLOAD_BYTES {
        return Err(ConfigError::invalid(
            "max_upload_bytes",
            config.max_upload_bytes.to_string(),
            "exceeds_ceiling",
        ));
    }
    let timeout_secs = config.tool.timeout.as_secs();
    if timeout_secs == 0 {
        return Err(ConfigError::invalid("tool_timeout_secs", "0", "zero"));
    }
    if timeout_secs > MAX_SANE_TIMEOUT_SECS {
        return Err(ConfigError::invalid(
            "tool_timeout_secs",
            timeout_secs.to_string(),
            "exceeds_ceiling",
        ));
    }
    if config.tool.scratch_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "scratch_dir",
            value: None,
            reason: "empty",
        });
    }
    if config.tool.jar_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "tool_jar",
            value: None,
            reason: "empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolConfig;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample() -> AppConfig {
        AppConfig {
            bind_addr: std::net::IpAddr::from([127, 0, 0, 1]),
            http_port: 5000,
            max_upload_bytes: 1024,
            tool: ToolConfig {
                jar_path: PathBuf::from("dpt.jar"),
                java_bin: PathBuf::from("java"),
                scratch_dir: PathBuf::from("/tmp"),
                timeout: Duration::from_secs(300),
                protect_config: None,
            },
        }
    }

    #[test]
    fn valid_config_passes() -> ConfigResult<()> {
        validate_config(&sample())
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut config = sample();
        config.max_upload_bytes = 0;
        assert!(validate_config(&config).is_err());

        let mut config = sample();
        config.tool.timeout = Duration::ZERO;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn ceilings_are_enforced() {
        let mut config = sample();
        config.tool.timeout = Duration::from_secs(7200);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidField {
                field: "tool_timeout_secs",
                reason: "exceeds_ceiling",
                ..
            })
        ));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let mut config = sample();
        config.tool.scratch_dir = PathBuf::new();
        assert!(validate_config(&config).is_err());

        let mut config = sample();
        config.tool.jar_path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }
}
