use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, routing::get, Json, Router};

use crate::application::dtos::document_dto::CategoryListDto;
use crate::common::di::AppState;
use crate::common::errors::AppError;
use crate::domain::entities::category::ClaimType;

pub fn category_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all_categories))
        .route("/{claim_type}", get(list_categories))
}

/// Checklists for every claim type
async fn list_all_categories() -> impl IntoResponse {
    let lists: Vec<CategoryListDto> = ClaimType::ALL.iter().copied().map(CategoryListDto::from).collect();
    Json(lists)
}

async fn list_categories(Path(claim_type): Path<String>) -> Result<impl IntoResponse, AppError> {
    let claim_type: ClaimType = claim_type.parse()?;
    Ok(Json(CategoryListDto::from(claim_type)))
}
