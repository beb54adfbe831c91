#![forbid(unsafe_code)]

//! HTTP surface for the apkshield service.
//!
//! Layout: `http/` (router, handlers, error mapping), `state.rs` (shared
//! request state), `error.rs` (server bootstrap/serve errors).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
