//! Export, preview, and saved-resume endpoints. PDF download routes return
//! raw bytes; everything else uses the JSON envelope.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Html,
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::service;
use crate::models::resume::SavedResumeMetaRow;
use crate::portfolio::bundle;
use crate::render::{preview, ExportOptions};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub template: Option<String>,
    #[serde(default)]
    pub ai_rewrite: bool,
    #[serde(default)]
    pub include_photo: bool,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub include_phone: bool,
    pub phone: Option<String>,
    #[serde(default)]
    pub include_linked_in: bool,
    pub linked_in: Option<String>,
    #[serde(default)]
    pub include_website: bool,
    pub website: Option<String>,
    pub title: Option<String>,
}

impl ExportQuery {
    fn options(&self) -> ExportOptions {
        ExportOptions {
            ai_rewrite: self.ai_rewrite,
            include_photo: self.include_photo,
            photo_url: self.photo_url.clone(),
            include_phone: self.include_phone,
            phone: self.phone.clone(),
            include_linkedin: self.include_linked_in,
            linkedin: self.linked_in.clone(),
            include_website: self.include_website,
            website: self.website.clone(),
        }
    }
}

/// Saved resume metadata plus the shareable URL once published.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResumeInfo {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub title: String,
    pub template_key: String,
    pub file_size_bytes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub public_url: Option<String>,
}

impl SavedResumeInfo {
    fn from_meta(meta: SavedResumeMetaRow, base_url: &str) -> Self {
        let public_url = service::public_resume_url(base_url, meta.publish_token.as_deref());
        Self {
            id: meta.id,
            portfolio_id: meta.portfolio_id,
            title: meta.title,
            template_key: meta.template_key,
            file_size_bytes: meta.file_size_bytes,
            created_at: meta.created_at,
            public_url,
        }
    }
}

/// POST /api/v1/portfolios/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ApiResponse<service::ExportResponse>>, AppError> {
    let response =
        service::generate_pdf(&state, id, user.id, query.template.as_deref(), &query.options())
            .await?;
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/v1/portfolios/:id/export/preview
pub async fn handle_export_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Html<String>, AppError> {
    let template_key = service::resolve_template_key(query.template.as_deref());
    let html =
        service::generate_print_html(&state, id, user.id, &template_key, &query.options()).await?;
    Ok(Html(html))
}

/// GET /api/v1/portfolios/:id/export/ai-status
pub async fn handle_ai_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let ready = service::is_ai_cache_warm(&state, id, user.id).await?;
    Ok(Json(ApiResponse::new(json!({ "ready": ready }))))
}

/// POST /api/v1/portfolios/:id/export/warm-ai
///
/// Kicks off enhancement in the background and returns immediately.
pub async fn handle_warm_ai(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Json<ApiResponse<serde_json::Value>> {
    let user_id = user.id;
    tokio::spawn(async move {
        if let Err(e) = service::warm_up_ai_cache(&state, id, user_id).await {
            warn!(portfolio_id = %id, error = %e, "AI cache warm-up failed");
        }
    });
    Json(ApiResponse::new(json!({ "status": "warming" })))
}

/// POST /api/v1/portfolios/:id/export/pdf/inline
pub async fn handle_export_pdf_inline(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let template_key = service::resolve_template_key(query.template.as_deref());
    let bytes =
        service::generate_pdf_bytes(&state, id, user.id, &template_key, &query.options()).await?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(Json(ApiResponse::new(json!({ "base64": encoded }))))
}

/// GET /api/v1/export/download/:token
///
/// Public; the short-lived token is the proof of generation.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<(HeaderMap, bytes::Bytes), AppError> {
    let pdf = state
        .temp_store
        .retrieve(&token)
        .ok_or_else(|| AppError::NotFound("Export token expired or unknown".to_string()))?;
    Ok((pdf_headers("resume.pdf", "attachment"), pdf))
}

// ---- saved resumes ----

/// POST /api/v1/portfolios/:id/export/save
pub async fn handle_export_save(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<(StatusCode, Json<ApiResponse<SavedResumeInfo>>), AppError> {
    let saved = service::generate_and_save(
        &state,
        id,
        user.id,
        query.template.as_deref(),
        &query.options(),
        query.title.as_deref(),
    )
    .await?;
    let info = SavedResumeInfo::from_meta(saved, &state.config.public_base_url);
    Ok((StatusCode::CREATED, Json(ApiResponse::new(info))))
}

/// GET /api/v1/saved-resumes
pub async fn handle_list_saved(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<SavedResumeInfo>>>, AppError> {
    let list = service::list_saved(&state, user.id)
        .await?
        .into_iter()
        .map(|meta| SavedResumeInfo::from_meta(meta, &state.config.public_base_url))
        .collect();
    Ok(Json(ApiResponse::new(list)))
}

/// GET /api/v1/saved-resumes/:id/pdf
pub async fn handle_download_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(HeaderMap, Vec<u8>), AppError> {
    let saved = service::get_saved(&state, id, user.id).await?;
    let filename = format!("{}.pdf", sanitize_filename(&saved.title));
    Ok((pdf_headers(&filename, "attachment"), saved.pdf_data))
}

/// GET /api/v1/saved-resumes/:id/base64
pub async fn handle_saved_base64(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let saved = service::get_saved(&state, id, user.id).await?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(saved.pdf_data);
    Ok(Json(ApiResponse::new(json!({ "base64": encoded }))))
}

/// DELETE /api/v1/saved-resumes/:id
pub async fn handle_delete_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_saved(&state, id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/saved-resumes/:id/publish
pub async fn handle_publish_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SavedResumeInfo>>, AppError> {
    let meta = service::publish_saved(&state, id, user.id).await?;
    Ok(Json(ApiResponse::new(SavedResumeInfo::from_meta(
        meta,
        &state.config.public_base_url,
    ))))
}

/// DELETE /api/v1/saved-resumes/:id/publish
pub async fn handle_unpublish_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SavedResumeInfo>>, AppError> {
    let meta = service::unpublish_saved(&state, id, user.id).await?;
    Ok(Json(ApiResponse::new(SavedResumeInfo::from_meta(
        meta,
        &state.config.public_base_url,
    ))))
}

// ---- public endpoints ----

/// GET /api/v1/public/resume/:token
pub async fn handle_public_resume(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), AppError> {
    let saved = service::get_by_publish_token(&state, &token).await?;
    let filename = format!("{}.pdf", sanitize_filename(&saved.title));
    Ok((pdf_headers(&filename, "inline"), saved.pdf_data))
}

/// GET /api/v1/portfolios/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let bundle = bundle::load(&state.db, id, user.id).await?;
    Ok(Html(preview::generate(&bundle)))
}

/// GET /api/v1/public/:slug
pub async fn handle_public_portfolio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let bundle = bundle::load_by_slug(&state.db, &slug).await?;
    Ok(Html(preview::generate(&bundle)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPortfolioMeta {
    pub slug: String,
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub display_name: Option<String>,
    pub project_count: usize,
    pub skill_count: usize,
}

/// GET /api/v1/public/:slug/meta
pub async fn handle_public_meta(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicPortfolioMeta>, AppError> {
    let bundle = bundle::load_by_slug(&state.db, &slug).await?;
    Ok(Json(PublicPortfolioMeta {
        slug: bundle.portfolio.slug,
        title: bundle.portfolio.title,
        tagline: bundle.portfolio.tagline,
        display_name: bundle.user.display_name,
        project_count: bundle.projects.len(),
        skill_count: bundle.skills.len(),
    }))
}

fn pdf_headers(filename: &str, disposition: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(value) =
        HeaderValue::from_str(&format!("{disposition}; filename=\"{filename}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers
}

fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Resume \u{2014} Dark"), "Resume___Dark");
        assert_eq!(sanitize_filename("my-resume.v2"), "my-resume.v2");
    }

    #[test]
    fn test_export_query_maps_to_options() {
        let query = ExportQuery {
            ai_rewrite: true,
            include_linked_in: true,
            linked_in: Some("alice".to_string()),
            ..Default::default()
        };
        let options = query.options();
        assert!(options.ai_rewrite);
        assert!(options.include_linkedin);
        assert_eq!(options.linkedin.as_deref(), Some("alice"));
        assert!(!options.include_phone);
    }
}
