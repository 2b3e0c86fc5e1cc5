//! Landing page.

use axum::response::Html;

use crate::render::{render_page, Outcome};

/// GET /
pub async fn index() -> Html<String> {
    Html(render_page(&Outcome::AwaitingVideo, ""))
}
