//! External tool invocation under a wall-clock ceiling.
//!
//! # Design
//! - One [`JobRunner::run`] call per request; the caller awaits the child
//!   process, so request handling blocks for the duration of the invocation.
//! - The subprocess handle is a scoped resource: a deadline is attached via
//!   `tokio::time::timeout` and `kill_on_drop` guarantees termination when
//!   the deadline fires.
//! - Workspace cleanup is reached from every branch through a single routine,
//!   never duplicated per branch.
//! - Success requires exit code zero AND a non-empty artifact; exit zero with
//!   missing or empty output is reported as a tool failure so a partial or
//!   absent artifact is never streamed back.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Instant;

use tokio::process::Command;
use tracing::{info, warn};
use walkdir::WalkDir;

use apkshield_config::ToolConfig;
use apkshield_telemetry::Metrics;

use crate::error::{JobError, JobResult};
use crate::options::{ProtectionOptions, build_command_args};
use crate::validate::{PROTECTED_PREFIX, sanitize_filename};
use crate::workspace::JobWorkspace;

/// Output file produced by a successful tool invocation.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Download filename: the marker prefix plus the sanitised upload name.
    pub filename: String,
    /// Full artifact contents, read before the workspace is reclaimed.
    pub bytes: Vec<u8>,
}

/// Executes protection jobs against the configured external tool.
#[derive(Clone)]
pub struct JobRunner {
    tool: ToolConfig,
    metrics: Metrics,
}

impl JobRunner {
    /// Build a runner over the given tool configuration.
    #[must_use]
    pub const fn new(tool: ToolConfig, metrics: Metrics) -> Self {
        Self { tool, metrics }
    }

    /// Tool configuration the runner was built with.
    #[must_use]
    pub const fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    /// Run one protection job: stage the upload, invoke the tool, and collect
    /// the artifact. The scratch workspace is removed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Environment`] when the tool jar is absent,
    /// [`JobError::Timeout`] when the ceiling is exceeded, and
    /// [`JobError::ToolExecution`] when the tool fails or produces no usable
    /// output.
    pub async fn run(
        &self,
        upload_name: &str,
        payload: &[u8],
        options: &ProtectionOptions,
    ) -> JobResult<Artifact> {
        if !self.tool.jar_path.is_file() {
            return Err(JobError::Environment {
                what: "tool_jar",
                detail: format!(
                    "protection tool artifact not found at {}",
                    self.tool.jar_path.display()
                ),
            });
        }

        let safe_name = sanitize_filename(upload_name);
        let mut workspace = JobWorkspace::create(&self.tool.scratch_dir, &safe_name).await?;

        self.metrics.job_started();
        let result = self.execute(&workspace, payload, options).await;
        self.metrics.job_finished();
        workspace.cleanup().await;

        result.map(|bytes| Artifact {
            filename: format!("{PROTECTED_PREFIX}{safe_name}"),
            bytes,
        })
    }

    async fn execute(
        &self,
        workspace: &JobWorkspace,
        payload: &[u8],
        options: &ProtectionOptions,
    ) -> JobResult<Vec<u8>> {
        workspace.stage_input(payload).await?;

        let args = build_command_args(
            &self.tool.jar_path,
            workspace.input_file(),
            workspace.output_dir(),
            options,
            self.tool.protect_config.as_deref(),
        );
        info!(
            launcher = %self.tool.java_bin.display(),
            options = ?options.enabled_names(),
            "invoking protection tool"
        );

        let started = Instant::now();
        let output = self.spawn_with_deadline(&args, workspace.root()).await?;
        self.metrics.observe_tool_runtime(started.elapsed());

        if !output.status.success() {
            let detail = capture_detail(&output);
            warn!(status = ?output.status.code(), "protection tool exited with failure");
            return Err(JobError::ToolExecution {
                status: output.status.code(),
                detail,
            });
        }

        let artifact_path = find_artifact(workspace.output_dir()).ok_or_else(|| {
            JobError::ToolExecution {
                status: output.status.code(),
                detail: non_empty_or(
                    capture_detail(&output),
                    "no output file found in the output directory",
                ),
            }
        })?;

        let bytes = tokio::fs::read(&artifact_path)
            .await
            .map_err(|source| JobError::io("runner.read_artifact", &artifact_path, source))?;
        if bytes.is_empty() {
            return Err(JobError::ToolExecution {
                status: output.status.code(),
                detail: "the protection process generated an empty file".to_string(),
            });
        }
        info!(
            artifact = %artifact_path.display(),
            size_bytes = bytes.len(),
            "protection tool completed"
        );
        Ok(bytes)
    }

    async fn spawn_with_deadline(&self, args: &[String], work_dir: &Path) -> JobResult<Output> {
        let mut command = Command::new(&self.tool.java_bin);
        command.args(args).current_dir(work_dir).kill_on_drop(true);

        let invocation = command.output();
        let output = tokio::time::timeout(self.tool.timeout, invocation)
            .await
            .map_err(|_| JobError::Timeout {
                limit_secs: self.tool.timeout.as_secs(),
            })?
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => JobError::Environment {
                    what: "java",
                    detail: format!(
                        "java launcher '{}' was not found; ensure a JDK is installed and JAVA_HOME is set",
                        self.tool.java_bin.display()
                    ),
                },
                _ => JobError::io("runner.spawn", self.tool.java_bin.clone(), source),
            })?;
        Ok(output)
    }
}

/// Locate the first `.apk`/`.aab` the tool wrote under the output directory.
fn find_artifact(output_dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    let ext = ext.to_ascii_lowercase();
                    ext == "apk" || ext == "aab"
                })
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn capture_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
