//! Upload acceptance checks and filename sanitisation.
//!
//! # Design
//! - Pure functions over the declared filename and byte size; the caller
//!   decides when a rejection becomes an HTTP response.
//! - The marker-prefix check stops a protected artifact from being fed back
//!   through the tool a second time.

use crate::error::{JobError, JobResult};

/// Filename prefix stamped on every artifact this service produces.
pub const PROTECTED_PREFIX: &str = "protected_";

/// Extensions accepted for upload, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &["apk", "aab"];

/// Decide whether an upload is acceptable given its declared name and size.
///
/// # Errors
///
/// Returns [`JobError::Validation`] naming the first failed check: empty
/// filename, disallowed extension, double-protection marker, or oversize.
#[allow(clippy::cast_precision_loss)]
pub fn check_upload(filename: &str, size_bytes: u64, max_bytes: u64) -> JobResult<()> {
    if filename.trim().is_empty() {
        return Err(JobError::validation("missing_file", "no file selected"));
    }
    if !has_allowed_extension(filename) {
        return Err(JobError::validation(
            "bad_extension",
            "invalid file type: only APK and AAB files are supported",
        ));
    }
    if filename.starts_with(PROTECTED_PREFIX) {
        return Err(JobError::validation(
            "already_protected",
            "this file appears to be already protected; upload the original package instead",
        ));
    }
    if size_bytes > max_bytes {
        let size_mb = size_bytes as f64 / (1024.0 * 1024.0);
        let max_mb = max_bytes as f64 / (1024.0 * 1024.0);
        return Err(JobError::validation("oversize", format!(
            "file size ({size_mb:.2} MB) exceeds the maximum allowed size ({max_mb:.0} MB)"
        )));
    }
    Ok(())
}

/// Reduce a declared filename to a safe single path component.
///
/// Path separators and parent references are stripped and any byte outside
/// `[A-Za-z0-9._-]` is replaced with `_`, mirroring the sanitiser the upload
/// form relied on historically.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let last_component = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = last_component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}

fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 150 * 1024 * 1024;

    #[test]
    fn accepts_apk_and_aab_case_insensitively() -> JobResult<()> {
        check_upload("app.apk", 10 * 1024, MAX)?;
        check_upload("bundle.AAB", 10 * 1024, MAX)?;
        check_upload("release.Apk", 10 * 1024, MAX)
    }

    #[test]
    fn rejects_disallowed_extensions() {
        for name in ["notanapk.txt", "archive.zip", "apk", "noext"] {
            let err = check_upload(name, 1024, MAX).expect_err("should reject");
            assert!(err.detail().contains("invalid file type"), "{name}");
        }
    }

    #[test]
    fn rejects_empty_filename() {
        let err = check_upload("", 1024, MAX).expect_err("should reject");
        assert!(matches!(err, JobError::Validation { .. }));
    }

    #[test]
    fn rejects_the_protected_marker_prefix() {
        let err = check_upload("protected_sample.apk", 1024, MAX).expect_err("should reject");
        assert!(err.detail().contains("already protected"));
    }

    #[test]
    fn rejects_oversized_uploads() {
        let err = check_upload("big.apk", MAX + 1, MAX).expect_err("should reject");
        assert!(err.detail().contains("exceeds the maximum"));
        check_upload("fits.apk", MAX, MAX).expect("exactly at the ceiling is accepted");
    }

    #[test]
    fn sanitize_strips_paths_and_odd_bytes() {
        assert_eq!(sanitize_filename("../../etc/passwd.apk"), "passwd.apk");
        assert_eq!(sanitize_filename("dir\\sub\\app.apk"), "app.apk");
        assert_eq!(sanitize_filename("my app (1).apk"), "my_app__1_.apk");
        assert_eq!(sanitize_filename("plain.apk"), "plain.apk");
    }
}
