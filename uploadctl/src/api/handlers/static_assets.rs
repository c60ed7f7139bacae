//! HTTP handlers for static asset serving.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{instrument, warn};

use crate::static_assets;

const UPLOAD_PAGE: &str = "upload.html";

/// Serve an embedded asset by path, or 404 if it isn't bundled.
fn embedded_asset(path: &str) -> Response {
    match static_assets::Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            warn!("Embedded asset {} is missing", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/file/upload/page",
    tag = "uploads",
    summary = "Upload form",
    description = "HTML page with one upload form per upload route.",
    responses(
        (status = 200, description = "Upload form", body = String, content_type = "text/html"),
    )
)]
#[instrument]
pub async fn upload_page() -> Response {
    embedded_asset(UPLOAD_PAGE)
}
