//! Shared request state for the API handlers.

use apkshield_config::AppConfig;
use apkshield_jobs::{HealthProbe, JobRunner};
use apkshield_telemetry::Metrics;

/// Dependencies every handler can reach through `State`.
pub struct ApiState {
    /// Validated service configuration.
    pub config: AppConfig,
    /// Shared metrics registry.
    pub metrics: Metrics,
    /// Protection job executor.
    pub runner: JobRunner,
    /// External-environment probe backing `/health`.
    pub probe: HealthProbe,
}

impl ApiState {
    /// Assemble the state from the validated configuration.
    #[must_use]
    pub fn new(config: AppConfig, metrics: Metrics) -> Self {
        let runner = JobRunner::new(config.tool.clone(), metrics.clone());
        let probe = HealthProbe::new(config.tool.clone());
        Self {
            config,
            metrics,
            runner,
            probe,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::IpAddr;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use apkshield_config::{AppConfig, ToolConfig};
    use apkshield_telemetry::Metrics;

    use super::ApiState;

    /// State over a scratch directory with a missing jar/launcher, enough for
    /// exercising the rejection and probe paths.
    pub(crate) fn state_with_scratch(scratch: &std::path::Path) -> Arc<ApiState> {
        let config = AppConfig {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            http_port: 5000,
            max_upload_bytes: 1024 * 1024,
            tool: ToolConfig {
                jar_path: scratch.join("missing-dpt.jar"),
                java_bin: PathBuf::from("/nonexistent/java"),
                scratch_dir: scratch.to_path_buf(),
                timeout: Duration::from_secs(5),
                protect_config: None,
            },
        };
        let metrics = Metrics::new().expect("metrics");
        Arc::new(ApiState::new(config, metrics))
    }
}
