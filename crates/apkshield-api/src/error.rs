//! # Design
//!
//! - Provide a single crate-level error type for API server bootstrap/serve failures.
//! - Keep error messages constant; capture operational context in structured fields.
//! - Preserve sources for diagnostics without double-logging.

use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for API server operations.
pub type ApiServerResult<T> = Result<T, ApiServerError>;

/// Errors raised while bootstrapping or serving the API.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the API listener failed.
    #[error("failed to bind api listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Serving the API failed.
    #[error("api server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn display_and_source_are_wired() {
        let bind = ApiServerError::Bind {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(bind.to_string(), "failed to bind api listener");
        assert!(bind.source().is_some());

        let serve = ApiServerError::Serve {
            source: io::Error::other("boom"),
        };
        assert_eq!(serve.to_string(), "api server terminated unexpectedly");
        assert!(serve.source().is_some());
    }
}
