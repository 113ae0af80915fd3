//! GitHub ingestion: fetch profile data, replace derived portfolio entities
//! in one transaction, then schedule background AI enhancement.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::enhancer;
use crate::errors::AppError;
use crate::github::{GithubClient, GithubRepo};
use crate::ingestion::markdown::clean_markdown;
use crate::models::portfolio::{PortfolioRow, Proficiency, ProjectRow, SectionType};
use crate::models::user::UserRow;
use crate::portfolio::service::{create_default_sections, generate_unique_slug};
use crate::state::AppState;

/// Top repos considered for byte-accurate language aggregation.
const LANGUAGE_FETCH_LIMIT: usize = 30;
/// Concurrent language requests in flight.
const LANGUAGE_FETCH_CONCURRENCY: usize = 8;
/// Projects flagged as highlighted, in star order.
const HIGHLIGHT_COUNT: usize = 6;
/// Highlighted projects that get a background AI rewrite.
const ENHANCE_PROJECT_CAP: usize = 5;

const DEFAULT_TAGLINE: &str = "Software developer passionate about building great products.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub theme_key: String,
    pub is_published: bool,
    pub project_count: i64,
    pub skill_count: i64,
}

/// Runs the synchronous ingestion phase and returns as soon as derived
/// entities are persisted. Enhancement continues in background tasks.
pub async fn ingest_from_github(
    state: &AppState,
    user_id: Uuid,
    login: &str,
) -> Result<PortfolioSummary, AppError> {
    // Token precedence: user's stored OAuth token > server token > anonymous.
    let user_token: Option<String> = sqlx::query_scalar(
        "SELECT access_token FROM auth_identities WHERE user_id = $1 AND provider = 'GITHUB'",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .flatten();

    let gh = match &user_token {
        Some(token) => {
            info!("Using user GitHub OAuth token for ingestion");
            state.github.with_user_token(token)
        }
        None => state.github.clone(),
    };

    let gh_user = gh.fetch_user(login).await?;
    let all_repos = gh.fetch_repos(login).await;
    let profile_readme = gh.fetch_profile_readme(login).await;
    info!("Profile README found: {}", profile_readme.is_some());

    // Non-fork, non-archived, stars descending.
    let mut repos: Vec<GithubRepo> = all_repos
        .into_iter()
        .filter(|r| !r.fork && !r.archived)
        .collect();
    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));

    let total_lang_bytes = fetch_aggregated_languages(login, &repos, &gh).await;
    info!(
        "Aggregated {} languages from GitHub languages API",
        total_lang_bytes.len()
    );

    let mut tx = state.db.begin().await?;

    // Row lock serializes concurrent ingestion for the same account.
    let _user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(tx.as_mut())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    sqlx::query("UPDATE users SET github_username = $2 WHERE id = $1")
        .bind(user_id)
        .bind(login)
        .execute(tx.as_mut())
        .await?;

    let display_name = gh_user
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(login)
        .to_string();
    let title = format!("{display_name}'s Portfolio");
    let tagline = gh_user
        .bio
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(DEFAULT_TAGLINE)
        .to_string();

    let existing: Vec<PortfolioRow> =
        sqlx::query_as("SELECT * FROM portfolios WHERE user_id = $1 ORDER BY created_at ASC")
            .bind(user_id)
            .fetch_all(tx.as_mut())
            .await?;

    let portfolio_id = if let Some(primary) = existing.first() {
        // Re-import: keep the portfolio row (id, AI cache) and user-authored
        // experience/education/certifications; replace GitHub-derived children.
        let pid = primary.id;
        sqlx::query("DELETE FROM projects WHERE portfolio_id = $1")
            .bind(pid)
            .execute(tx.as_mut())
            .await?;
        sqlx::query("DELETE FROM skills WHERE portfolio_id = $1")
            .bind(pid)
            .execute(tx.as_mut())
            .await?;
        sqlx::query("DELETE FROM sections WHERE portfolio_id = $1")
            .bind(pid)
            .execute(tx.as_mut())
            .await?;
        sqlx::query("UPDATE portfolios SET title = $2, tagline = $3, updated_at = now() WHERE id = $1")
            .bind(pid)
            .bind(&title)
            .bind(&tagline)
            .execute(tx.as_mut())
            .await?;
        create_default_sections(tx.as_mut(), pid).await?;
        info!("Re-imported portfolio {pid} for user {user_id} (preserved user data)");

        // Extra portfolios violate the one-per-user invariant; ON DELETE
        // CASCADE clears their children and publish records.
        for extra in &existing[1..] {
            sqlx::query("DELETE FROM portfolios WHERE id = $1")
                .bind(extra.id)
                .execute(tx.as_mut())
                .await?;
        }
        pid
    } else {
        let slug = generate_unique_slug(tx.as_mut(), login).await?;
        let pid: Uuid = sqlx::query_scalar(
            "INSERT INTO portfolios (user_id, slug, title, tagline) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(&slug)
        .bind(&title)
        .bind(&tagline)
        .fetch_one(tx.as_mut())
        .await?;
        create_default_sections(tx.as_mut(), pid).await?;
        pid
    };

    if let Some(readme) = profile_readme.as_deref().filter(|r| !r.trim().is_empty()) {
        sqlx::query(
            "UPDATE sections SET content = $2 WHERE portfolio_id = $1 AND section_type = $3",
        )
        .bind(portfolio_id)
        .bind(clean_markdown(readme))
        .bind(SectionType::About.as_str())
        .execute(tx.as_mut())
        .await?;
    }

    for (i, repo) in repos.iter().enumerate() {
        let languages: Vec<String> = repo.language.iter().cloned().collect();
        sqlx::query(
            r#"
            INSERT INTO projects
                (portfolio_id, github_repo_id, name, description, url, languages,
                 stars, forks, is_highlighted, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(portfolio_id)
        .bind(repo.id.to_string())
        .bind(&repo.name)
        .bind(&repo.description)
        .bind(&repo.html_url)
        .bind(Json(languages))
        .bind(repo.stargazers_count as i32)
        .bind(repo.forks_count as i32)
        .bind(i < HIGHLIGHT_COUNT)
        .bind(i as i32)
        .execute(tx.as_mut())
        .await?;
    }

    // Byte aggregate when available, per-repo primary-language counts otherwise.
    let using_fallback = total_lang_bytes.is_empty();
    let lang_data = if using_fallback {
        build_fallback_lang_counts(&repos)
    } else {
        total_lang_bytes
    };
    let sorted_langs = sort_languages(lang_data);
    let max_value = sorted_langs.first().map(|(_, v)| *v).unwrap_or(1);

    for (order, (name, value)) in sorted_langs.iter().enumerate() {
        let proficiency = infer_proficiency(*value, max_value, using_fallback);
        sqlx::query(
            "INSERT INTO skills (portfolio_id, name, proficiency, display_order) VALUES ($1, $2, $3, $4)",
        )
        .bind(portfolio_id)
        .bind(name)
        .bind(proficiency.as_str())
        .bind(order as i32)
        .execute(tx.as_mut())
        .await?;
    }

    let saved_projects: Vec<ProjectRow> = sqlx::query_as(
        "SELECT * FROM projects WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(portfolio_id)
    .fetch_all(tx.as_mut())
    .await?;

    tx.commit().await?;

    let top_language_names: Vec<String> = sorted_langs
        .iter()
        .take(6)
        .map(|(name, _)| name.clone())
        .collect();

    schedule_enhancement(
        state,
        portfolio_id,
        display_name,
        profile_readme.unwrap_or_default(),
        top_language_names,
        &saved_projects,
    );

    let project_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE portfolio_id = $1")
            .bind(portfolio_id)
            .fetch_one(&state.db)
            .await?;
    let skill_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM skills WHERE portfolio_id = $1")
            .bind(portfolio_id)
            .fetch_one(&state.db)
            .await?;

    let portfolio: PortfolioRow = sqlx::query_as("SELECT * FROM portfolios WHERE id = $1")
        .bind(portfolio_id)
        .fetch_one(&state.db)
        .await?;

    Ok(PortfolioSummary {
        id: portfolio.id,
        slug: portfolio.slug,
        title: portfolio.title,
        tagline: portfolio.tagline,
        theme_key: portfolio.theme_key,
        is_published: portfolio.is_published,
        project_count,
        skill_count,
    })
}

/// Fire-and-forget: one summary task plus up to five highlighted-project
/// tasks. Each captures plain values and re-reads its row before writing, so
/// a task finishing late never clobbers a newer ingestion's data beyond its
/// own columns. Completion is logged from a single join task.
fn schedule_enhancement(
    state: &AppState,
    portfolio_id: Uuid,
    display_name: String,
    profile_readme: String,
    top_languages: Vec<String>,
    saved_projects: &[ProjectRow],
) {
    let db = state.db.clone();
    let ollama = state.ollama.clone();
    let permits = state.enhancer_permits.clone();

    let summary_task = {
        let db = db.clone();
        let ollama = ollama.clone();
        let permits = permits.clone();
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await;
            let summary =
                enhancer::enhance_summary(&ollama, &display_name, &profile_readme, &top_languages)
                    .await;
            if let Some(summary) = summary {
                if let Err(e) = save_summary(&db, portfolio_id, &summary).await {
                    warn!("Failed to save AI summary for portfolio {portfolio_id}: {e}");
                } else {
                    info!("AI summary saved for portfolio {portfolio_id}");
                }
            }
        })
    };

    let project_tasks: Vec<_> = saved_projects
        .iter()
        .filter(|p| p.is_highlighted)
        .take(ENHANCE_PROJECT_CAP)
        .map(|p| {
            let db = db.clone();
            let ollama = ollama.clone();
            let permits = permits.clone();
            let project_id = p.id;
            let name = p.name.clone();
            let description = p.description.clone().unwrap_or_default();
            let languages = p.languages.0.clone();
            let stars = p.stars;
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                let enhanced = enhancer::enhance_project_description(
                    &ollama,
                    &name,
                    &description,
                    &languages,
                    stars,
                )
                .await;
                if let Some(enhanced) = enhanced {
                    if let Err(e) = save_project_enhancement(&db, project_id, &enhanced).await {
                        warn!("Failed to save AI description for project {project_id}: {e}");
                    }
                }
            })
        })
        .collect();

    tokio::spawn(async move {
        let _ = summary_task.await;
        for task in project_tasks {
            let _ = task.await;
        }
        info!("AI enhancement complete for portfolio {portfolio_id}");
    });
}

async fn save_summary(db: &PgPool, portfolio_id: Uuid, summary: &str) -> Result<(), sqlx::Error> {
    // Re-check the row still exists; a concurrent re-ingest may have
    // replaced the portfolio set entirely.
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM portfolios WHERE id = $1")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await?;
    if exists.is_none() {
        return Ok(());
    }
    sqlx::query(
        "UPDATE portfolios SET ai_enhanced_summary = $2, ai_enhanced_at = now() WHERE id = $1",
    )
    .bind(portfolio_id)
    .bind(summary)
    .execute(db)
    .await?;
    sqlx::query("UPDATE sections SET content = $2 WHERE portfolio_id = $1 AND section_type = $3")
        .bind(portfolio_id)
        .bind(summary)
        .bind(SectionType::About.as_str())
        .execute(db)
        .await?;
    Ok(())
}

async fn save_project_enhancement(
    db: &PgPool,
    project_id: Uuid,
    enhanced: &str,
) -> Result<(), sqlx::Error> {
    let fresh: Option<Uuid> = sqlx::query_scalar("SELECT id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(db)
        .await?;
    if fresh.is_none() {
        return Ok(());
    }
    sqlx::query(
        "UPDATE projects SET ai_enhanced_description = $2, ai_enhanced_at = now() WHERE id = $1",
    )
    .bind(project_id)
    .bind(enhanced)
    .execute(db)
    .await?;
    Ok(())
}

/// Sums per-language byte counts across the top repos. Per-repo failures
/// contribute nothing.
async fn fetch_aggregated_languages(
    login: &str,
    repos: &[GithubRepo],
    gh: &GithubClient,
) -> HashMap<String, i64> {
    // Each future owns its repo name; nothing borrows the slice across awaits.
    let results: Vec<HashMap<String, i64>> = stream::iter(language_fetch_targets(repos))
        .map(|name| async move { gh.fetch_repo_languages(login, &name).await })
        .buffer_unordered(LANGUAGE_FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut totals: HashMap<String, i64> = HashMap::new();
    for langs in results {
        for (lang, bytes) in langs {
            *totals.entry(lang).or_insert(0) += bytes;
        }
    }
    totals
}

/// Owned repo names for the language fan-out, capped at the fetch limit.
fn language_fetch_targets(repos: &[GithubRepo]) -> Vec<String> {
    repos
        .iter()
        .take(LANGUAGE_FETCH_LIMIT)
        .map(|r| r.name.clone())
        .collect()
}

/// Repo-count fallback when the languages API returned nothing at all.
fn build_fallback_lang_counts(repos: &[GithubRepo]) -> HashMap<String, i64> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for repo in repos {
        if let Some(lang) = &repo.language {
            *counts.entry(lang.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Sorts descending by value, then by name so equal values order
/// deterministically.
fn sort_languages(data: HashMap<String, i64>) -> Vec<(String, i64)> {
    let mut entries: Vec<(String, i64)> = data.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn infer_proficiency(value: i64, max_value: i64, is_count: bool) -> Proficiency {
    if is_count {
        return match value {
            v if v >= 10 => Proficiency::Expert,
            v if v >= 5 => Proficiency::Advanced,
            v if v >= 2 => Proficiency::Intermediate,
            _ => Proficiency::Beginner,
        };
    }
    let pct = value as f64 / max_value.max(1) as f64 * 100.0;
    if pct >= 40.0 {
        Proficiency::Expert
    } else if pct >= 20.0 {
        Proficiency::Advanced
    } else if pct >= 8.0 {
        Proficiency::Intermediate
    } else {
        Proficiency::Beginner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: i64, language: Option<&str>) -> GithubRepo {
        GithubRepo {
            id: 1,
            name: name.to_string(),
            full_name: format!("u/{name}"),
            description: None,
            html_url: format!("https://github.com/u/{name}"),
            language: language.map(str::to_string),
            stargazers_count: stars,
            forks_count: 0,
            fork: false,
            archived: false,
        }
    }

    #[test]
    fn test_infer_proficiency_byte_share() {
        // Rust 12000 of max 12000 -> 100% -> EXPERT
        assert_eq!(infer_proficiency(12000, 12000, false), Proficiency::Expert);
        // TypeScript 4000 of max 12000 -> ~33% -> ADVANCED
        assert_eq!(infer_proficiency(4000, 12000, false), Proficiency::Advanced);
        // 8% boundary is inclusive
        assert_eq!(infer_proficiency(960, 12000, false), Proficiency::Intermediate);
        assert_eq!(infer_proficiency(100, 12000, false), Proficiency::Beginner);
    }

    #[test]
    fn test_infer_proficiency_count_fallback() {
        assert_eq!(infer_proficiency(10, 10, true), Proficiency::Expert);
        assert_eq!(infer_proficiency(5, 10, true), Proficiency::Advanced);
        assert_eq!(infer_proficiency(2, 10, true), Proficiency::Intermediate);
        assert_eq!(infer_proficiency(1, 10, true), Proficiency::Beginner);
    }

    #[test]
    fn test_language_fetch_targets_caps_and_preserves_order() {
        let repos: Vec<GithubRepo> = (0..LANGUAGE_FETCH_LIMIT + 10)
            .map(|i| repo(&format!("r{i}"), 100 - i as i64, Some("Rust")))
            .collect();
        let targets = language_fetch_targets(&repos);
        assert_eq!(targets.len(), LANGUAGE_FETCH_LIMIT);
        assert_eq!(targets.first().map(String::as_str), Some("r0"));
        assert_eq!(targets.last().map(String::as_str), Some("r29"));
    }

    #[test]
    fn test_fallback_counts_skip_missing_language() {
        let repos = vec![
            repo("a", 3, Some("Rust")),
            repo("b", 2, Some("Rust")),
            repo("c", 1, None),
            repo("d", 0, Some("Go")),
        ];
        let counts = build_fallback_lang_counts(&repos);
        assert_eq!(counts.get("Rust"), Some(&2));
        assert_eq!(counts.get("Go"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_sort_languages_descending_with_name_tiebreak() {
        let mut data = HashMap::new();
        data.insert("Rust".to_string(), 12000);
        data.insert("TypeScript".to_string(), 4000);
        data.insert("Go".to_string(), 4000);
        let sorted = sort_languages(data);
        assert_eq!(sorted[0].0, "Rust");
        assert_eq!(sorted[1].0, "Go");
        assert_eq!(sorted[2].0, "TypeScript");
    }
}
