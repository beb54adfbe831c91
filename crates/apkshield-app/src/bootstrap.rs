//! Environment loading and service wiring for the apkshield binary.

use std::net::SocketAddr;

use tracing::info;

use apkshield_api::ApiServer;
use apkshield_config::AppConfig;
use apkshield_telemetry::{LoggingConfig, Metrics};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the apkshield service.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    config: AppConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary
    /// entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig::default();
        let config =
            AppConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            logging,
            config,
            telemetry,
        })
    }
}

/// Entry point for the apkshield boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or application startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    apkshield_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let BootstrapDependencies {
        logging: _,
        config,
        telemetry,
    } = dependencies;

    let addr = SocketAddr::new(config.bind_addr, config.http_port);
    info!(
        %addr,
        jar = %config.tool.jar_path.display(),
        java = %config.tool.java_bin.display(),
        timeout_secs = config.tool.timeout_secs(),
        max_upload_bytes = config.max_upload_bytes,
        "apkshield starting"
    );

    let server = ApiServer::new(config, telemetry);
    server
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api.serve", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    use apkshield_config::ToolConfig;

    fn dependencies(scratch: &std::path::Path, port: u16) -> BootstrapDependencies {
        BootstrapDependencies {
            logging: LoggingConfig::default(),
            config: AppConfig {
                bind_addr: IpAddr::from([127, 0, 0, 1]),
                http_port: port,
                max_upload_bytes: 1024,
                tool: ToolConfig {
                    jar_path: scratch.join("dpt.jar"),
                    java_bin: PathBuf::from("java"),
                    scratch_dir: scratch.to_path_buf(),
                    timeout: Duration::from_secs(5),
                    protect_config: None,
                },
            },
            telemetry: Metrics::new().expect("metrics"),
        }
    }

    #[tokio::test]
    async fn boot_fails_cleanly_when_the_port_is_taken() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let err = run_app_with(dependencies(scratch.path(), port))
            .await
            .expect_err("bind conflict expected");
        assert!(matches!(
            err,
            AppError::ApiServer {
                operation: "api.serve",
                ..
            }
        ));
    }
}
