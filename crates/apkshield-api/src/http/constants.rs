//! Shared HTTP constants (headers, content types, form field names).

/// MIME type for Android packages returned from `/protect`.
pub(crate) const CONTENT_TYPE_PACKAGE: &str = "application/vnd.android.package-archive";
/// Cache directive attached to artifact downloads.
pub(crate) const CACHE_CONTROL_DOWNLOAD: &str = "no-cache, no-store, must-revalidate";

/// Multipart field carrying the uploaded package.
pub(crate) const FIELD_FILE: &str = "apk_file";
/// Multipart slack on top of the configured upload ceiling for the other
/// form fields and part framing.
pub(crate) const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;
