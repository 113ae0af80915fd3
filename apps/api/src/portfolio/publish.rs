use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::portfolio::service::find_owned_portfolio;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub published_url: String,
    pub version: i32,
    pub published_at: DateTime<Utc>,
}

/// Marks the portfolio published and appends an immutable publish record
/// with a per-portfolio monotonically increasing version.
pub async fn publish(
    db: &PgPool,
    portfolio_id: Uuid,
    user_id: Uuid,
    base_url: &str,
) -> Result<PublishResponse, AppError> {
    let portfolio = find_owned_portfolio(db, portfolio_id, user_id).await?;

    let mut tx = db.begin().await?;
    sqlx::query("UPDATE portfolios SET is_published = true, updated_at = now() WHERE id = $1")
        .bind(portfolio_id)
        .execute(tx.as_mut())
        .await?;

    let published_url = published_url(base_url, &portfolio.slug);
    let next_version: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(version), 0) + 1 FROM publish_records WHERE portfolio_id = $1",
    )
    .bind(portfolio_id)
    .fetch_one(tx.as_mut())
    .await?;

    let published_at: DateTime<Utc> = sqlx::query_scalar(
        r#"
        INSERT INTO publish_records (portfolio_id, published_url, version)
        VALUES ($1, $2, $3)
        RETURNING published_at
        "#,
    )
    .bind(portfolio_id)
    .bind(&published_url)
    .bind(next_version)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    Ok(PublishResponse {
        published_url,
        version: next_version,
        published_at,
    })
}

/// Public URL for a published portfolio, served by the public slug route.
fn published_url(base_url: &str, slug: &str) -> String {
    format!("{}/api/v1/public/{}", base_url.trim_end_matches('/'), slug)
}

/// Clears the published flag; the slug stays reserved and publish history
/// is retained.
pub async fn unpublish(db: &PgPool, portfolio_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    find_owned_portfolio(db, portfolio_id, user_id).await?;
    sqlx::query("UPDATE portfolios SET is_published = false, updated_at = now() WHERE id = $1")
        .bind(portfolio_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_url_uses_served_route() {
        assert_eq!(
            published_url("http://localhost:8080/", "alice-dev"),
            "http://localhost:8080/api/v1/public/alice-dev"
        );
        assert_eq!(
            published_url("https://openfolio.example", "alice-dev"),
            "https://openfolio.example/api/v1/public/alice-dev"
        );
    }
}
