use axum::response::{IntoResponse, Json};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "folio-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
