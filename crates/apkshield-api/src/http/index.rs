//! Upload form page.

use axum::response::Html;

/// Embedded single-page upload form.
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// `GET /`: serve the upload form.
pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
