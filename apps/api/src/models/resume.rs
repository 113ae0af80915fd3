use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A persistently stored rendered PDF. `pdf_data` is only selected by the
/// download paths; listings use [`SavedResumeInfo`]-shaped queries instead.
#[derive(Debug, Clone, FromRow)]
pub struct SavedResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub portfolio_id: Uuid,
    pub title: String,
    pub template_key: String,
    pub file_size_bytes: i64,
    pub pdf_data: Vec<u8>,
    pub publish_token: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Metadata-only projection of a saved resume (no PDF bytes).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedResumeMetaRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub title: String,
    pub template_key: String,
    pub file_size_bytes: i64,
    pub publish_token: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A resume-builder document: header overrides plus the subset of portfolio
/// items selected for inclusion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub portfolio_id: Uuid,
    pub title: String,
    pub template_key: String,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub summary: Option<String>,
    pub selected_project_ids: Json<Vec<Uuid>>,
    pub selected_skill_ids: Json<Vec<Uuid>>,
    pub selected_experience_ids: Json<Vec<Uuid>>,
    pub selected_education_ids: Json<Vec<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
