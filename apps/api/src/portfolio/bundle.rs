//! Bundle loader: everything needed to render a portfolio, materialized
//! up-front so rendering never goes back to the database.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{
    CertificationRow, EducationRow, ExperienceRow, PortfolioRow, ProjectRow, SectionRow, SkillRow,
    SectionType,
};
use crate::models::user::UserRow;

#[derive(Debug, Clone)]
pub struct Bundle {
    pub portfolio: PortfolioRow,
    pub user: UserRow,
    pub about: Option<String>,
    pub projects: Vec<ProjectRow>,
    pub skills: Vec<SkillRow>,
    pub experiences: Vec<ExperienceRow>,
    pub education: Vec<EducationRow>,
    pub certifications: Vec<CertificationRow>,
}

/// Loads a bundle with an ownership check.
pub async fn load(db: &PgPool, portfolio_id: Uuid, user_id: Uuid) -> Result<Bundle, AppError> {
    let portfolio: PortfolioRow = sqlx::query_as("SELECT * FROM portfolios WHERE id = $1")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))?;
    if portfolio.user_id != user_id {
        return Err(AppError::Unauthorized);
    }
    load_children(db, portfolio).await
}

/// Loads a bundle by public slug. Unpublished portfolios are invisible here.
pub async fn load_by_slug(db: &PgPool, slug: &str) -> Result<Bundle, AppError> {
    let portfolio: PortfolioRow = sqlx::query_as("SELECT * FROM portfolios WHERE slug = $1")
        .bind(slug)
        .fetch_optional(db)
        .await?
        .filter(|p: &PortfolioRow| p.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Portfolio '{slug}' not found")))?;
    load_children(db, portfolio).await
}

async fn load_children(db: &PgPool, portfolio: PortfolioRow) -> Result<Bundle, AppError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(portfolio.user_id)
        .fetch_one(db)
        .await?;

    let about: Option<SectionRow> = sqlx::query_as(
        "SELECT * FROM sections WHERE portfolio_id = $1 AND section_type = $2",
    )
    .bind(portfolio.id)
    .bind(SectionType::About.as_str())
    .fetch_optional(db)
    .await?;

    let projects: Vec<ProjectRow> = sqlx::query_as(
        "SELECT * FROM projects WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio.id)
    .fetch_all(db)
    .await?;

    let skills: Vec<SkillRow> = sqlx::query_as(
        "SELECT * FROM skills WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio.id)
    .fetch_all(db)
    .await?;

    let experiences: Vec<ExperienceRow> = sqlx::query_as(
        "SELECT * FROM experiences WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio.id)
    .fetch_all(db)
    .await?;

    let education: Vec<EducationRow> = sqlx::query_as(
        "SELECT * FROM education WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio.id)
    .fetch_all(db)
    .await?;

    let certifications: Vec<CertificationRow> = sqlx::query_as(
        "SELECT * FROM certifications WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio.id)
    .fetch_all(db)
    .await?;

    Ok(Bundle {
        portfolio,
        user,
        about: about.and_then(|s| s.content).filter(|c| !c.trim().is_empty()),
        projects,
        skills,
        experiences,
        education,
        certifications,
    })
}
