//! Resume builder: CRUD over resume documents plus HTML/PDF generation.
//!
//! A new resume is pre-populated from the portfolio (name, email, GitHub
//! handle, about text) with every portfolio item selected, so the first
//! preview is already complete.

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::service::ExportResponse;
use crate::models::portfolio::{PortfolioRow, SectionType};
use crate::models::resume::ResumeRow;
use crate::models::user::UserRow;
use crate::render::pdf;
use crate::resume::{bundle, templates};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub portfolio_id: Uuid,
    pub title: Option<String>,
    pub template_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub template_key: Option<String>,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub summary: Option<String>,
    pub selected_project_ids: Option<Vec<Uuid>>,
    pub selected_skill_ids: Option<Vec<Uuid>>,
    pub selected_experience_ids: Option<Vec<Uuid>>,
    pub selected_education_ids: Option<Vec<Uuid>>,
}

pub async fn list(db: &PgPool, user_id: Uuid) -> Result<Vec<ResumeRow>, AppError> {
    let resumes = sqlx::query_as(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(resumes)
}

pub async fn get_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    req: CreateResumeRequest,
) -> Result<ResumeRow, AppError> {
    let portfolio: PortfolioRow = sqlx::query_as("SELECT * FROM portfolios WHERE id = $1")
        .bind(req.portfolio_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {} not found", req.portfolio_id)))?;
    if portfolio.user_id != user_id {
        return Err(AppError::Unauthorized);
    }

    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    let about: Option<String> = sqlx::query_scalar(
        "SELECT content FROM sections WHERE portfolio_id = $1 AND section_type = $2",
    )
    .bind(portfolio.id)
    .bind(SectionType::About.as_str())
    .fetch_optional(db)
    .await?
    .flatten();

    let project_ids = item_ids(db, "projects", portfolio.id).await?;
    let skill_ids = item_ids(db, "skills", portfolio.id).await?;
    let experience_ids = item_ids(db, "experiences", portfolio.id).await?;
    let education_ids = item_ids(db, "education", portfolio.id).await?;

    let github_url = user
        .github_username
        .as_deref()
        .map(|login| format!("https://github.com/{login}"));
    let now = Utc::now();

    let resume: ResumeRow = sqlx::query_as(
        "INSERT INTO resumes (id, user_id, portfolio_id, title, template_key, full_name, email, \
         github_url, summary, selected_project_ids, selected_skill_ids, selected_experience_ids, \
         selected_education_ids, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(portfolio.id)
    .bind(req.title.unwrap_or_else(|| "My Resume".to_string()))
    .bind(req.template_key.unwrap_or_else(|| "classic".to_string()))
    .bind(&user.display_name)
    .bind(&user.email)
    .bind(github_url)
    .bind(about)
    .bind(Json(project_ids))
    .bind(Json(skill_ids))
    .bind(Json(experience_ids))
    .bind(Json(education_ids))
    .bind(now)
    .fetch_one(db)
    .await?;

    info!(resume_id = %resume.id, portfolio_id = %portfolio.id, "resume created");
    Ok(resume)
}

async fn item_ids(db: &PgPool, table: &str, portfolio_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    // table names come from the fixed call sites above, never from input
    let ids = sqlx::query_scalar(&format!(
        "SELECT id FROM {table} WHERE portfolio_id = $1 ORDER BY display_order"
    ))
    .bind(portfolio_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    req: UpdateResumeRequest,
) -> Result<ResumeRow, AppError> {
    let existing = get_owned(db, id, user_id).await?;

    let resume: ResumeRow = sqlx::query_as(
        "UPDATE resumes SET \
         title = COALESCE($2, title), \
         template_key = COALESCE($3, template_key), \
         full_name = COALESCE($4, full_name), \
         job_title = COALESCE($5, job_title), \
         email = COALESCE($6, email), \
         phone = COALESCE($7, phone), \
         location = COALESCE($8, location), \
         website = COALESCE($9, website), \
         linkedin_url = COALESCE($10, linkedin_url), \
         github_url = COALESCE($11, github_url), \
         summary = COALESCE($12, summary), \
         selected_project_ids = COALESCE($13, selected_project_ids), \
         selected_skill_ids = COALESCE($14, selected_skill_ids), \
         selected_experience_ids = COALESCE($15, selected_experience_ids), \
         selected_education_ids = COALESCE($16, selected_education_ids), \
         updated_at = $17 \
         WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(req.title)
    .bind(req.template_key)
    .bind(req.full_name)
    .bind(req.job_title)
    .bind(req.email)
    .bind(req.phone)
    .bind(req.location)
    .bind(req.website)
    .bind(req.linkedin_url)
    .bind(req.github_url)
    .bind(req.summary)
    .bind(req.selected_project_ids.map(Json))
    .bind(req.selected_skill_ids.map(Json))
    .bind(req.selected_experience_ids.map(Json))
    .bind(req.selected_education_ids.map(Json))
    .bind(Utc::now())
    .fetch_one(db)
    .await?;
    Ok(resume)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(())
}

/// Preview HTML using the resume's stored template.
pub async fn preview_html(state: &AppState, id: Uuid, user_id: Uuid) -> Result<String, AppError> {
    let resume = get_owned(&state.db, id, user_id).await?;
    let key = resume.template_key.clone();
    let bundle = bundle::load(&state.db, resume).await?;
    Ok(templates::generate(&bundle, &key))
}

/// Preview HTML with a template tried on without saving it.
pub async fn preview_html_with_template(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
    template_key: &str,
) -> Result<String, AppError> {
    let resume = get_owned(&state.db, id, user_id).await?;
    let bundle = bundle::load(&state.db, resume).await?;
    Ok(templates::generate(&bundle, template_key))
}

pub async fn generate_pdf(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<ExportResponse, AppError> {
    let (bytes, template_key) = generate_pdf_bytes(state, id, user_id).await?;
    let token = state.temp_store.store(bytes);
    let download_url = format!(
        "{}/api/v1/export/download/{token}",
        state.config.public_base_url.trim_end_matches('/')
    );
    info!(resume_id = %id, template = %template_key, "resume PDF exported");
    Ok(ExportResponse { token, download_url, template_key })
}

pub async fn generate_pdf_bytes(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<(Vec<u8>, String), AppError> {
    let resume = get_owned(&state.db, id, user_id).await?;
    let key = resume.template_key.clone();
    let bundle = bundle::load(&state.db, resume).await?;
    let html = templates::generate_for_pdf(&bundle, &key);
    let bytes = pdf::render_pdf(&state.config.pdf_command, &html).await?;
    Ok((bytes, key))
}
