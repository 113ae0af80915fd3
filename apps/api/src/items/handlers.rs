//! CRUD for user-authored portfolio items: experiences, education,
//! certifications. Ingestion never touches these tables.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::{CertificationRow, EducationRow, ExperienceRow};
use crate::portfolio::service::find_owned_portfolio;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Asserts the item's portfolio belongs to the caller, returning the
/// portfolio id it hangs off.
async fn find_owned_item_portfolio(
    db: &PgPool,
    table: &str,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<Uuid, AppError> {
    // `table` is always one of our own literals, never user input.
    let query = format!(
        "SELECT p.id, p.user_id FROM {table} i JOIN portfolios p ON p.id = i.portfolio_id WHERE i.id = $1"
    );
    let row: Option<(Uuid, Uuid)> = sqlx::query_as(&query)
        .bind(item_id)
        .fetch_optional(db)
        .await?;
    let (portfolio_id, owner) =
        row.ok_or_else(|| AppError::NotFound(format!("Item {item_id} not found")))?;
    if owner != user_id {
        return Err(AppError::Unauthorized);
    }
    Ok(portfolio_id)
}

// ---- experiences ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub company: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub display_order: i32,
}

/// GET /api/v1/portfolios/:id/experiences
pub async fn handle_list_experiences(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ExperienceRow>>>, AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let rows: Vec<ExperienceRow> =
        sqlx::query_as("SELECT * FROM experiences WHERE portfolio_id = $1 ORDER BY display_order")
            .bind(portfolio_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(ApiResponse::new(rows)))
}

/// POST /api/v1/portfolios/:id/experiences
pub async fn handle_create_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
    Json(req): Json<ExperienceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExperienceRow>>), AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let row: ExperienceRow = sqlx::query_as(
        r#"
        INSERT INTO experiences
            (portfolio_id, company, title, description, start_date, end_date, is_current, display_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(&req.company)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.is_current)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(row))))
}

/// PUT /api/v1/experiences/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ExperienceRequest>,
) -> Result<Json<ApiResponse<ExperienceRow>>, AppError> {
    find_owned_item_portfolio(&state.db, "experiences", id, user.id).await?;
    let row: ExperienceRow = sqlx::query_as(
        r#"
        UPDATE experiences SET
            company = $2, title = $3, description = $4, start_date = $5,
            end_date = $6, is_current = $7, display_order = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.company)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.is_current)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(ApiResponse::new(row)))
}

/// DELETE /api/v1/experiences/:id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    find_owned_item_portfolio(&state.db, "experiences", id, user.id).await?;
    sqlx::query("DELETE FROM experiences WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- education ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequest {
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub display_order: i32,
}

/// GET /api/v1/portfolios/:id/education
pub async fn handle_list_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<EducationRow>>>, AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let rows: Vec<EducationRow> =
        sqlx::query_as("SELECT * FROM education WHERE portfolio_id = $1 ORDER BY display_order")
            .bind(portfolio_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(ApiResponse::new(rows)))
}

/// POST /api/v1/portfolios/:id/education
pub async fn handle_create_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
    Json(req): Json<EducationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EducationRow>>), AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let row: EducationRow = sqlx::query_as(
        r#"
        INSERT INTO education
            (portfolio_id, institution, degree, field, start_year, end_year, display_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(&req.institution)
    .bind(&req.degree)
    .bind(&req.field)
    .bind(req.start_year)
    .bind(req.end_year)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(row))))
}

/// PUT /api/v1/education/:id
pub async fn handle_update_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EducationRequest>,
) -> Result<Json<ApiResponse<EducationRow>>, AppError> {
    find_owned_item_portfolio(&state.db, "education", id, user.id).await?;
    let row: EducationRow = sqlx::query_as(
        r#"
        UPDATE education SET
            institution = $2, degree = $3, field = $4, start_year = $5,
            end_year = $6, display_order = $7
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.institution)
    .bind(&req.degree)
    .bind(&req.field)
    .bind(req.start_year)
    .bind(req.end_year)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(ApiResponse::new(row)))
}

/// DELETE /api/v1/education/:id
pub async fn handle_delete_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    find_owned_item_portfolio(&state.db, "education", id, user.id).await?;
    sqlx::query("DELETE FROM education WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- certifications ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationRequest {
    pub name: String,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// GET /api/v1/portfolios/:id/certifications
pub async fn handle_list_certifications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CertificationRow>>>, AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let rows: Vec<CertificationRow> = sqlx::query_as(
        "SELECT * FROM certifications WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ApiResponse::new(rows)))
}

/// POST /api/v1/portfolios/:id/certifications
pub async fn handle_create_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<Uuid>,
    Json(req): Json<CertificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CertificationRow>>), AppError> {
    find_owned_portfolio(&state.db, portfolio_id, user.id).await?;
    let row: CertificationRow = sqlx::query_as(
        r#"
        INSERT INTO certifications
            (portfolio_id, name, issuing_organization, issue_date, expiry_date,
             credential_id, credential_url, display_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(&req.name)
    .bind(&req.issuing_organization)
    .bind(req.issue_date)
    .bind(req.expiry_date)
    .bind(&req.credential_id)
    .bind(&req.credential_url)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(row))))
}

/// PUT /api/v1/certifications/:id
pub async fn handle_update_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CertificationRequest>,
) -> Result<Json<ApiResponse<CertificationRow>>, AppError> {
    find_owned_item_portfolio(&state.db, "certifications", id, user.id).await?;
    let row: CertificationRow = sqlx::query_as(
        r#"
        UPDATE certifications SET
            name = $2, issuing_organization = $3, issue_date = $4, expiry_date = $5,
            credential_id = $6, credential_url = $7, display_order = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.issuing_organization)
    .bind(req.issue_date)
    .bind(req.expiry_date)
    .bind(&req.credential_id)
    .bind(&req.credential_url)
    .bind(req.display_order)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(ApiResponse::new(row)))
}

/// DELETE /api/v1/certifications/:id
pub async fn handle_delete_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    find_owned_item_portfolio(&state.db, "certifications", id, user.id).await?;
    sqlx::query("DELETE FROM certifications WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
