//! Route definitions

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{handlers, state::AppState, REPORT_URL};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Visit / for the screening form or /api/health to check API status.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed.",
        })),
    )
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_size = state.config.max_upload_size;
    let static_dir = state.config.static_dir.clone();

    let api_routes = Router::new()
        .route("/predict", post(handlers::api_predict))
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    let mut app = Router::new()
        .route("/", get(handlers::serve_index))
        .route("/predict", post(handlers::predict_form))
        .route(REPORT_URL, get(handlers::download_report))
        .nest("/api", api_routes)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .with_state(state);

    // Branding images are optional
    if static_dir.is_dir() {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app.layer(TraceLayer::new_for_http())
}
