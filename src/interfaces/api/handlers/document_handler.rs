use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::application::dtos::document_dto::{
    CreateDocumentDto, FolderPathQuery, StructureQuery, UploadDocumentCommand,
};
use crate::common::di::AppState;
use crate::common::errors::AppError;
use crate::domain::entities::document::{ClaimId, PolicyId, UserId};

/// Slack on top of the file limit for the other multipart fields
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn document_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload",
            post(upload_document).layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/", post(create_document).get(list_documents))
        .route("/folder-path", get(derive_folder_path))
        .route("/structure", get(inspect_structure))
        .route("/user/{user_id}", get(list_by_user))
        .route("/policy/{policy_id}", get(list_by_policy))
        .route("/claim/{claim_id}", get(list_by_claim))
        .route("/{id}", get(get_document).delete(delete_document))
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart?;
    let mut command = UploadDocumentCommand::default();
    let mut has_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            command.file_name = field.file_name().map(str::to_string);
            command.content_type = field.content_type().map(str::to_string);
            command.content = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("Failed to read uploaded file: {}", e)))?;
            has_file = true;
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid form field '{}': {}", name, e)))?;

        match name.as_str() {
            "userId" => command.user_id = Some(value),
            "documentType" => command.document_type = Some(value),
            "policyId" => command.policy_id = Some(value),
            "claimId" => command.claim_id = Some(value),
            "category" => command.category = Some(value),
            "claimType" => command.claim_type = Some(value),
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    if !has_file {
        return Err(AppError::bad_request("No file provided"));
    }

    let response = state.applications.upload_service.upload_document(command).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_document(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateDocumentDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(dto) = body?;
    let document = state.applications.upload_service.create_document(dto).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn list_documents(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let documents = state.applications.retrieval_service.list_documents().await?;
    Ok(Json(documents))
}

async fn list_by_user(
    State(state): State<Arc<AppState>>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let documents = state.applications.retrieval_service.list_by_user(user_id).await?;
    Ok(Json(documents))
}

async fn list_by_policy(
    State(state): State<Arc<AppState>>,
    path: Result<Path<PolicyId>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(policy_id) = path?;
    let documents = state.applications.retrieval_service.list_by_policy(policy_id).await?;
    Ok(Json(documents))
}

async fn list_by_claim(
    State(state): State<Arc<AppState>>,
    path: Result<Path<ClaimId>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(claim_id) = path?;
    let documents = state.applications.retrieval_service.list_by_claim(claim_id).await?;
    Ok(Json(documents))
}

async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.applications.retrieval_service.get_document(&id).await?;
    Ok(Json(document))
}

async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.applications.management_service.delete_document(&id).await?;
    Ok(Json(json!({ "message": "Document deleted successfully" })))
}

async fn derive_folder_path(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FolderPathQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let folder = state.applications.retrieval_service.derive_folder_path(query)?;
    Ok(Json(folder))
}

async fn inspect_structure(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StructureQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    Ok(Json(state.applications.retrieval_service.inspect_url(&query.url)))
}
