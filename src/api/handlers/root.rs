use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Service banner; the branded pages live with the rendering surface.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
