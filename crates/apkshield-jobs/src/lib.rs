#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Protection job orchestration: validate an uploaded package, map options to
//! tool flags, run the external protection tool under a timeout, and hand the
//! produced artifact back while guaranteeing scratch cleanup on every path.
//!
//! Layout: `validate.rs` (upload acceptance), `options.rs` (typed options and
//! the flag mapper), `workspace.rs` (per-job scratch directory guard),
//! `runner.rs` (subprocess execution), `health.rs` (environment probe).

pub mod error;
pub mod health;
pub mod options;
pub mod runner;
pub mod validate;
pub mod workspace;

pub use error::{JobError, JobResult};
pub use health::{HealthProbe, HealthReport};
pub use options::{Abi, ProtectionOptions, RawOptions};
pub use runner::{Artifact, JobRunner};
pub use validate::{PROTECTED_PREFIX, check_upload, sanitize_filename};
pub use workspace::JobWorkspace;
