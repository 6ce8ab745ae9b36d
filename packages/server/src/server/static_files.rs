use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

// Browser page and the bundled Lightspeed category table, embedded at compile time
#[derive(RustEmbed)]
#[folder = "public/"]
pub struct PublicAssets;

/// Serve the embedded page; `/` maps to index.html.
pub async fn serve_public(uri: Uri) -> Response {
    serve_asset::<PublicAssets>(uri.path())
}

fn serve_asset<E: RustEmbed>(path: &str) -> Response {
    let path = path.trim_start_matches('/');

    // If path is empty, serve index.html
    let path = if path.is_empty() { "index.html" } else { path };

    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}
