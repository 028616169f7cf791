//! Static file serving for the embedded control panel
//!
//! Uses rust-embed to bundle the public/ folder (panel page and service
//! worker) into the binary.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::Embed;

/// Embedded panel assets from the public/ folder
#[derive(Embed)]
#[folder = "public/"]
struct PanelAssets;

/// Serve embedded static files, falling back to index.html for `/`
pub async fn serve_static(req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match serve_file(path) {
        Some(response) => response,
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Serve a specific file from embedded assets
fn serve_file(path: &str) -> Option<Response<Body>> {
    let file = PanelAssets::get(path)?;

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    // The service worker must always be revalidated so updates reach browsers
    let cache_control = if path.ends_with(".png") || path.ends_with(".ico") {
        "public, max-age=86400"
    } else {
        "public, max-age=0, must-revalidate"
    };

    Some(
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, cache_control.to_string()),
            ],
            file.data.into_owned(),
        )
            .into_response(),
    )
}

/// Check if the panel is embedded (i.e., public/index.html was present at compile time)
pub fn has_embedded_panel() -> bool {
    PanelAssets::get("index.html").is_some()
}
