use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::common::di::AppState;
use crate::interfaces::api::handlers::category_handler::category_routes;
use crate::interfaces::api::handlers::document_handler::document_routes;

/// Creates API routes for the application
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.uploads.max_file_size_bytes;

    Router::new()
        .nest("/documents", document_routes(max_upload_bytes))
        .nest("/categories", category_routes())
        .with_state(state)
}

/// Full application router: API, local uploads and HTTP layers
pub fn create_app(state: Arc<AppState>) -> Router {
    let uploads_dir = state.config.storage.uploads_dir.clone();

    Router::new()
        .nest("/api", create_api_routes(state))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
