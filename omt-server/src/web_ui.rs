//! Embedded web UI

use axum::response::Html;

/// Serve the embedded dashboard page
pub async fn serve_ui() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}
