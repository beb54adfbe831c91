//! Error types for configuration operations.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was absent.
    #[error("missing environment variable")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.into()),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_carries_context() {
        let err = ConfigError::invalid("http_port", "0", "zero");
        match err {
            ConfigError::InvalidField {
                field,
                value,
                reason,
            } => {
                assert_eq!(field, "http_port");
                assert_eq!(value.as_deref(), Some("0"));
                assert_eq!(reason, "zero");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn messages_stay_constant() {
        assert_eq!(
            ConfigError::MissingEnv { name: "X" }.to_string(),
            "missing environment variable"
        );
        assert_eq!(
            ConfigError::invalid("scratch_dir", "", "empty").to_string(),
            "invalid configuration field"
        );
    }
}
