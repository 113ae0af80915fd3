use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::{PortfolioRow, ProjectRow, SkillRow};
use crate::portfolio::publish::{self, PublishResponse};
use crate::portfolio::service::{self, find_owned_portfolio};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummaryResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub theme_key: String,
    pub is_published: bool,
    pub project_count: i64,
    pub skill_count: i64,
}

impl PortfolioSummaryResponse {
    fn from_row(p: PortfolioRow, project_count: i64, skill_count: i64) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            tagline: p.tagline,
            theme_key: p.theme_key,
            is_published: p.is_published,
            project_count,
            skill_count,
        }
    }
}

async fn counts(state: &AppState, portfolio_id: Uuid) -> Result<(i64, i64), AppError> {
    let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .fetch_one(&state.db)
        .await?;
    let skills: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .fetch_one(&state.db)
        .await?;
    Ok((projects, skills))
}

/// GET /api/v1/portfolios
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<PortfolioSummaryResponse>>>, AppError> {
    let rows: Vec<PortfolioRow> =
        sqlx::query_as("SELECT * FROM portfolios WHERE user_id = $1 ORDER BY created_at ASC")
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let (project_count, skill_count) = counts(&state, row.id).await?;
        summaries.push(PortfolioSummaryResponse::from_row(row, project_count, skill_count));
    }
    Ok(Json(ApiResponse::new(summaries)))
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    pub title: String,
    pub tagline: Option<String>,
}

/// POST /api/v1/portfolios
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreatePortfolioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PortfolioSummaryResponse>>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let slug = service::generate_unique_slug(tx.as_mut(), &req.title).await?;
    let portfolio: PortfolioRow = sqlx::query_as(
        "INSERT INTO portfolios (user_id, slug, title, tagline) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user.id)
    .bind(&slug)
    .bind(req.title.trim())
    .bind(&req.tagline)
    .fetch_one(tx.as_mut())
    .await?;
    service::create_default_sections(tx.as_mut(), portfolio.id).await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PortfolioSummaryResponse::from_row(portfolio, 0, 0))),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub theme_key: Option<String>,
    pub published: Option<bool>,
}

/// PATCH /api/v1/portfolios/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePortfolioRequest>,
) -> Result<Json<ApiResponse<PortfolioSummaryResponse>>, AppError> {
    find_owned_portfolio(&state.db, id, user.id).await?;

    let portfolio: PortfolioRow = sqlx::query_as(
        r#"
        UPDATE portfolios SET
            title = COALESCE($2, title),
            tagline = COALESCE($3, tagline),
            theme_key = COALESCE($4, theme_key),
            is_published = COALESCE($5, is_published),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.tagline)
    .bind(&req.theme_key)
    .bind(req.published)
    .fetch_one(&state.db)
    .await?;

    let (project_count, skill_count) = counts(&state, id).await?;
    Ok(Json(ApiResponse::new(PortfolioSummaryResponse::from_row(
        portfolio,
        project_count,
        skill_count,
    ))))
}

/// DELETE /api/v1/portfolios/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    find_owned_portfolio(&state.db, id, user.id).await?;
    sqlx::query("DELETE FROM portfolios WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/portfolios/:id/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ProjectRow>>>, AppError> {
    find_owned_portfolio(&state.db, id, user.id).await?;
    let projects: Vec<ProjectRow> =
        sqlx::query_as("SELECT * FROM projects WHERE portfolio_id = $1 ORDER BY display_order")
            .bind(id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(ApiResponse::new(projects)))
}

/// GET /api/v1/portfolios/:id/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SkillRow>>>, AppError> {
    find_owned_portfolio(&state.db, id, user.id).await?;
    let skills: Vec<SkillRow> =
        sqlx::query_as("SELECT * FROM skills WHERE portfolio_id = $1 ORDER BY display_order")
            .bind(id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(ApiResponse::new(skills)))
}

/// POST /api/v1/portfolios/:id/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublishResponse>>, AppError> {
    let response = publish::publish(&state.db, id, user.id, &state.config.public_base_url).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/v1/portfolios/:id/publish
pub async fn handle_unpublish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    publish::unpublish(&state.db, id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
