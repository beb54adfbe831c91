//! Per-job scratch workspace with guaranteed cleanup.
//!
//! # Design
//! - Every job gets a uniquely named directory under the configured scratch
//!   root so concurrent jobs never collide.
//! - Cleanup runs exactly once through [`JobWorkspace::cleanup`]; `Drop`
//!   backstops the paths that return early before reaching it.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::{JobError, JobResult};

/// Directory-name prefix for job workspaces under the scratch root.
const WORKSPACE_PREFIX: &str = "apk_protect_";
/// Subdirectory the external tool writes its output into.
const OUTPUT_DIR_NAME: &str = "output";

/// Scratch directory owned by exactly one protection job.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
    input_file: PathBuf,
    output_dir: PathBuf,
    cleaned: bool,
}

impl JobWorkspace {
    /// Create a fresh workspace under `scratch_root` for the given sanitised
    /// input filename.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Io`] when the directories cannot be created.
    pub async fn create(scratch_root: &Path, input_filename: &str) -> JobResult<Self> {
        let root = scratch_root.join(format!("{WORKSPACE_PREFIX}{}", Uuid::new_v4().simple()));
        let output_dir = root.join(OUTPUT_DIR_NAME);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| JobError::io("workspace.create", &output_dir, source))?;
        let input_file = root.join(input_filename);
        Ok(Self {
            root,
            input_file,
            output_dir,
            cleaned: false,
        })
    }

    /// Workspace root; also used as the child process working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the uploaded package is staged at.
    #[must_use]
    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    /// Directory the external tool writes its artifact into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Stage the uploaded bytes into the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Io`] when the write fails.
    pub async fn stage_input(&self, bytes: &[u8]) -> JobResult<()> {
        tokio::fs::write(&self.input_file, bytes)
            .await
            .map_err(|source| JobError::io("workspace.stage_input", &self.input_file, source))
    }

    /// Remove the workspace and everything beneath it, best effort.
    ///
    /// Safe to call once on every exit path; subsequent calls and the `Drop`
    /// backstop become no-ops.
    pub async fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if let Err(err) = tokio::fs::remove_dir_all(&self.root).await {
            warn!(path = %self.root.display(), error = %err, "failed to remove job workspace");
        }
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if let Err(err) = std::fs::remove_dir_all(&self.root) {
            warn!(path = %self.root.display(), error = %err, "failed to remove job workspace on drop");
        }
    }
}
