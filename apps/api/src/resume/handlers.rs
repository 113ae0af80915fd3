//! Resume builder endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use base64::Engine;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::service::ExportResponse;
use crate::models::resume::ResumeRow;
use crate::response::ApiResponse;
use crate::resume::service::{self, CreateResumeRequest, UpdateResumeRequest};
use crate::resume::templates::{self, TemplateInfo};
use crate::state::AppState;

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ResumeRow>>>, AppError> {
    let resumes = service::list(&state.db, user.id).await?;
    Ok(Json(ApiResponse::new(resumes)))
}

/// POST /api/v1/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ResumeRow>>), AppError> {
    let resume = service::create(&state.db, user.id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(resume))))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    let resume = service::get_owned(&state.db, id, user.id).await?;
    Ok(Json(ApiResponse::new(resume)))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    let resume = service::update(&state.db, id, user.id, req).await?;
    Ok(Json(ApiResponse::new(resume)))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete(&state.db, id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let html = service::preview_html(&state, id, user.id).await?;
    Ok(Html(html))
}

/// GET /api/v1/resumes/:id/preview/:templateKey
///
/// Renders with the given template without persisting the choice.
pub async fn handle_preview_with_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, template_key)): Path<(Uuid, String)>,
) -> Result<Html<String>, AppError> {
    let html = service::preview_html_with_template(&state, id, user.id, &template_key).await?;
    Ok(Html(html))
}

/// POST /api/v1/resumes/:id/pdf
pub async fn handle_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExportResponse>>, AppError> {
    let response = service::generate_pdf(&state, id, user.id).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/v1/resumes/:id/pdf/inline
pub async fn handle_pdf_inline(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (bytes, _) = service::generate_pdf_bytes(&state, id, user.id).await?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(Json(ApiResponse::new(json!({ "base64": encoded }))))
}

/// GET /api/v1/resumes/templates
pub async fn handle_templates() -> Json<ApiResponse<Vec<TemplateInfo>>> {
    Json(ApiResponse::new(templates::catalog()))
}
