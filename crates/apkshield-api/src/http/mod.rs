//! HTTP surface modules (router, handlers, error mapping).

/// Shared constants and header values for HTTP surfaces.
pub mod constants;
/// Error response helpers and the `{error, details}` wrapper.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Upload form page.
pub mod index;
/// Protect upload handler.
pub mod protect;
/// Router construction and server host.
pub mod router;
