//! PDF export pipeline: load the bundle, optionally AI-rewrite it (with a
//! database-backed cache), render HTML, and hand it to the PDF renderer.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::enhancer;
use crate::errors::AppError;
use crate::models::resume::{SavedResumeMetaRow, SavedResumeRow};
use crate::portfolio::bundle::{self, Bundle};
use crate::render::{self, pdf, print, ExportOptions};
use crate::state::AppState;

/// Overall deadline for one batch of AI rewrites; stragglers keep their
/// raw descriptions for this render.
const ENHANCE_DEADLINE: Duration = Duration::from_secs(180);
const SUMMARY_LANGUAGE_CAP: usize = 6;

/// Cap on Ollama calls in flight across all export requests.
pub const ENHANCER_CONCURRENCY: usize = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub token: String,
    pub download_url: String,
    pub template_key: String,
}

pub fn resolve_template_key(template: Option<&str>) -> String {
    template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "pdf".to_string())
}

/// Generates a PDF and parks it in the temp store behind a short-lived
/// download token.
pub async fn generate_pdf(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
    template: Option<&str>,
    options: &ExportOptions,
) -> Result<ExportResponse, AppError> {
    let template_key = resolve_template_key(template);
    let bytes = generate_pdf_bytes(state, portfolio_id, user_id, &template_key, options).await?;
    let size_kb = bytes.len() / 1024;
    let token = state.temp_store.store(bytes);
    let download_url = format!(
        "{}/api/v1/export/download/{}",
        state.config.public_base_url.trim_end_matches('/'),
        token
    );
    info!(%portfolio_id, template = %template_key, size_kb, %token, "generated PDF export");
    Ok(ExportResponse {
        token,
        download_url,
        template_key,
    })
}

/// Generates raw PDF bytes for in-app viewing.
pub async fn generate_pdf_bytes(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
    template_key: &str,
    options: &ExportOptions,
) -> Result<Vec<u8>, AppError> {
    let html = generate_print_html(state, portfolio_id, user_id, template_key, options).await?;
    pdf::render_pdf(&state.config.pdf_command, &html).await
}

/// The exact HTML the PDF renderer would consume, for in-app preview.
pub async fn generate_print_html(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
    template_key: &str,
    options: &ExportOptions,
) -> Result<String, AppError> {
    let mut bundle = bundle::load(&state.db, portfolio_id, user_id).await?;
    if options.ai_rewrite {
        enhance_bundle(state, &mut bundle).await?;
    }
    Ok(print::generate(&bundle, template_key, options))
}

/// True when the summary and every project with a raw description already
/// have cached enhancements, so an aiRewrite render needs no model calls.
pub async fn is_ai_cache_warm(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let bundle = bundle::load(&state.db, portfolio_id, user_id).await?;
    if bundle
        .portfolio
        .ai_enhanced_summary
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        return Ok(false);
    }
    let cold = bundle.projects.iter().any(|p| {
        p.description.as_deref().is_some_and(|d| !d.trim().is_empty())
            && p.ai_enhanced_description
                .as_deref()
                .map_or(true, |d| d.trim().is_empty())
    });
    Ok(!cold)
}

/// Runs all enhancements now so later aiRewrite renders hit the cache.
pub async fn warm_up_ai_cache(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    let mut bundle = bundle::load(&state.db, portfolio_id, user_id).await?;
    enhance_bundle(state, &mut bundle).await?;
    info!(%portfolio_id, "AI cache warmed");
    Ok(())
}

/// AI-enhances the bundle in place: project descriptions first (parallel,
/// DB-cached), then the professional summary (DB-cached). Failures and
/// timeouts leave the raw text in place.
async fn enhance_bundle(state: &AppState, bundle: &mut Bundle) -> Result<(), AppError> {
    enhance_project_descriptions(state, bundle).await;

    if let Some(summary) = enhance_summary(state, bundle).await? {
        bundle.about = Some(summary);
    }
    Ok(())
}

async fn enhance_summary(state: &AppState, bundle: &Bundle) -> Result<Option<String>, AppError> {
    if let Some(cached) = bundle
        .portfolio
        .ai_enhanced_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        info!(portfolio_id = %bundle.portfolio.id, "using cached AI summary");
        return Ok(Some(cached.to_string()));
    }

    let Some(raw) = bundle.about.as_deref().filter(|a| !a.trim().is_empty()) else {
        return Ok(None);
    };

    let name = render::resolve_display_name(bundle);
    let top_languages: Vec<String> = bundle
        .skills
        .iter()
        .take(SUMMARY_LANGUAGE_CAP)
        .map(|s| s.name.clone())
        .collect();

    let Some(enhanced) = enhancer::enhance_summary(&state.ollama, &name, raw, &top_languages).await
    else {
        warn!(portfolio_id = %bundle.portfolio.id, "AI summary enhancement produced nothing");
        return Ok(None);
    };

    sqlx::query(
        "UPDATE portfolios SET ai_enhanced_summary = $2, ai_enhanced_at = $3 WHERE id = $1",
    )
    .bind(bundle.portfolio.id)
    .bind(&enhanced)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;
    info!(portfolio_id = %bundle.portfolio.id, "saved AI summary to cache");
    Ok(Some(enhanced))
}

/// Rewrites raw project descriptions into resume bullets, in parallel on
/// the shared permit pool. Cached rows are substituted without a model
/// call; fresh results are persisted before substitution.
async fn enhance_project_descriptions(state: &AppState, bundle: &mut Bundle) {
    let mut need_ai: Vec<usize> = Vec::new();
    for (idx, project) in bundle.projects.iter_mut().enumerate() {
        let has_raw = project
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if !has_raw {
            continue;
        }
        match project
            .ai_enhanced_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            Some(cached) => project.description = Some(cached.to_string()),
            None => need_ai.push(idx),
        }
    }
    if need_ai.is_empty() {
        return;
    }
    info!(count = need_ai.len(), "AI-enhancing project descriptions in parallel");

    let mut tasks = Vec::with_capacity(need_ai.len());
    for idx in need_ai {
        let project = bundle.projects[idx].clone();
        let ollama = state.ollama.clone();
        let db = state.db.clone();
        let permits = state.enhancer_permits.clone();
        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (idx, None);
            };
            let raw = project.description.as_deref().unwrap_or_default();
            let Some(enhanced) = enhancer::enhance_project_description(
                &ollama,
                &project.name,
                raw,
                &project.languages.0,
                project.stars,
            )
            .await
            else {
                warn!(project = %project.name, "AI enhancement produced nothing");
                return (idx, None);
            };
            let saved = sqlx::query(
                "UPDATE projects SET ai_enhanced_description = $2, ai_enhanced_at = $3 WHERE id = $1",
            )
            .bind(project.id)
            .bind(&enhanced)
            .bind(Utc::now())
            .execute(&db)
            .await;
            if let Err(e) = saved {
                warn!(project = %project.name, error = %e, "failed to cache AI description");
            }
            (idx, Some(enhanced))
        }));
    }

    let joined = tokio::time::timeout(ENHANCE_DEADLINE, futures::future::join_all(tasks)).await;
    match joined {
        Ok(results) => {
            for result in results {
                if let Ok((idx, Some(enhanced))) = result {
                    bundle.projects[idx].description = Some(enhanced);
                }
            }
            info!("AI project enhancements completed");
        }
        Err(_) => warn!("some AI enhancements timed out; raw descriptions kept"),
    }
}

// ---- saved resumes ----

/// Generates a PDF and persists it with metadata.
pub async fn generate_and_save(
    state: &AppState,
    portfolio_id: Uuid,
    user_id: Uuid,
    template: Option<&str>,
    options: &ExportOptions,
    title: Option<&str>,
) -> Result<SavedResumeMetaRow, AppError> {
    let template_key = resolve_template_key(template);
    let bytes = generate_pdf_bytes(state, portfolio_id, user_id, &template_key, options).await?;
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Resume \u{2014} {}", capitalize(&template_key)));

    let size_kb = bytes.len() / 1024;
    let saved: SavedResumeMetaRow = sqlx::query_as(
        r#"
        INSERT INTO saved_resumes
            (user_id, portfolio_id, title, template_key, file_size_bytes, pdf_data)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, portfolio_id, title, template_key, file_size_bytes,
                  publish_token, published_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(portfolio_id)
    .bind(&title)
    .bind(&template_key)
    .bind(bytes.len() as i64)
    .bind(&bytes)
    .fetch_one(&state.db)
    .await?;
    info!(%user_id, %portfolio_id, size_kb, saved_id = %saved.id, "saved resume PDF");
    Ok(saved)
}

/// Metadata for all of the user's saved resumes, newest first.
pub async fn list_saved(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<SavedResumeMetaRow>, AppError> {
    let rows: Vec<SavedResumeMetaRow> = sqlx::query_as(
        r#"
        SELECT id, portfolio_id, title, template_key, file_size_bytes,
               publish_token, published_at, created_at
        FROM saved_resumes WHERE user_id = $1 ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(rows)
}

pub async fn get_saved(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<SavedResumeRow, AppError> {
    let row: Option<SavedResumeRow> =
        sqlx::query_as("SELECT * FROM saved_resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Saved resume {id} not found")))
}

/// Deletes by (id, owner). Deleting someone else's resume, or one that is
/// already gone, is a silent no-op.
pub async fn delete_saved(state: &AppState, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM saved_resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

/// Mints a publish token if the resume does not have one yet; publishing is
/// idempotent and keeps the existing token.
pub async fn publish_saved(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<SavedResumeMetaRow, AppError> {
    let saved = get_saved(state, id, user_id).await?;
    if saved.publish_token.is_none() {
        let token = Uuid::new_v4().simple().to_string();
        sqlx::query(
            "UPDATE saved_resumes SET publish_token = $2, published_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&token)
        .execute(&state.db)
        .await?;
    }
    saved_meta(state, id, user_id).await
}

pub async fn unpublish_saved(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<SavedResumeMetaRow, AppError> {
    get_saved(state, id, user_id).await?;
    sqlx::query(
        "UPDATE saved_resumes SET publish_token = NULL, published_at = NULL WHERE id = $1",
    )
    .bind(id)
    .execute(&state.db)
    .await?;
    saved_meta(state, id, user_id).await
}

pub async fn get_by_publish_token(
    state: &AppState,
    token: &str,
) -> Result<SavedResumeRow, AppError> {
    let row: Option<SavedResumeRow> =
        sqlx::query_as("SELECT * FROM saved_resumes WHERE publish_token = $1")
            .bind(token)
            .fetch_optional(&state.db)
            .await?;
    row.ok_or_else(|| AppError::NotFound("Published resume not found".to_string()))
}

async fn saved_meta(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<SavedResumeMetaRow, AppError> {
    let row: Option<SavedResumeMetaRow> = sqlx::query_as(
        r#"
        SELECT id, portfolio_id, title, template_key, file_size_bytes,
               publish_token, published_at, created_at
        FROM saved_resumes WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Saved resume {id} not found")))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Shareable URL for a published saved resume, `None` while unpublished.
pub fn public_resume_url(base_url: &str, publish_token: Option<&str>) -> Option<String> {
    publish_token.map(|token| {
        format!(
            "{}/api/v1/public/resume/{}",
            base_url.trim_end_matches('/'),
            token
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_template_key_defaults_and_lowercases() {
        assert_eq!(resolve_template_key(None), "pdf");
        assert_eq!(resolve_template_key(Some("  ")), "pdf");
        assert_eq!(resolve_template_key(Some("Dark")), "dark");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hacker"), "Hacker");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_public_resume_url() {
        assert_eq!(
            public_resume_url("http://localhost:8080/", Some("abc")).as_deref(),
            Some("http://localhost:8080/api/v1/public/resume/abc")
        );
        assert_eq!(public_resume_url("http://localhost:8080", None), None);
    }
}
