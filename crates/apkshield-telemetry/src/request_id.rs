//! `x-request-id` middleware for the HTTP stack.
//!
//! # Design
//! - One header name, owned here, shared by the layers and the trace span.
//! - Generation and propagation stay separate layers so the propagate side
//!   can sit outside the span that reads the header.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header every request carries once the middleware stack has run.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer that stamps requests missing an `x-request-id` with a fresh UUID.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_name_matches_the_layer_wiring() {
        // SetRequestIdLayer::x_request_id hard-codes the same header name.
        assert_eq!(REQUEST_ID_HEADER, "x-request-id");
        let _set = set_request_id_layer();
        let _propagate = propagate_request_id_layer();
    }
}
