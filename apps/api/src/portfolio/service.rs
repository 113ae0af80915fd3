use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{PortfolioRow, SectionType};

const SLUG_MAX_LEN: usize = 80;

/// Loads a portfolio and asserts ownership. Fails fast with Unauthorized
/// before any data is touched.
pub async fn find_owned_portfolio(
    db: &PgPool,
    portfolio_id: Uuid,
    user_id: Uuid,
) -> Result<PortfolioRow, AppError> {
    let portfolio: PortfolioRow = sqlx::query_as("SELECT * FROM portfolios WHERE id = $1")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))?;
    if portfolio.user_id != user_id {
        return Err(AppError::Unauthorized);
    }
    Ok(portfolio)
}

/// One row per default section type, in display order.
pub async fn create_default_sections(
    conn: &mut PgConnection,
    portfolio_id: Uuid,
) -> Result<(), sqlx::Error> {
    for (order, (section_type, title)) in SectionType::defaults().iter().enumerate() {
        sqlx::query(
            "INSERT INTO sections (portfolio_id, section_type, title, display_order) VALUES ($1, $2, $3, $4)",
        )
        .bind(portfolio_id)
        .bind(section_type.as_str())
        .bind(title)
        .bind(order as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// URL-safe slug from an arbitrary base string.
pub fn slugify(base: &str) -> String {
    let mut slug = String::with_capacity(base.len());
    let mut last_hyphen = true; // suppress leading hyphen
    for c in base.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug = "portfolio".to_string();
    }
    slug.truncate(SLUG_MAX_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slugifies the base and appends a random 6-char suffix when taken.
pub async fn generate_unique_slug(
    conn: &mut PgConnection,
    base: &str,
) -> Result<String, sqlx::Error> {
    let slug = slugify(base);
    let taken: Option<Uuid> = sqlx::query_scalar("SELECT id FROM portfolios WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&mut *conn)
        .await?;
    if taken.is_none() {
        return Ok(slug);
    }
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    Ok(format!("{slug}-{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Alice Dev"), "alice-dev");
        assert_eq!(slugify("alice-dev"), "alice-dev");
    }

    #[test]
    fn test_slugify_strips_symbols_and_collapses() {
        assert_eq!(slugify("Rust & Systems!!  Engineer"), "rust-systems-engineer");
        assert_eq!(slugify("--already--hyphenated--"), "already-hyphenated");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "portfolio");
        assert_eq!(slugify(""), "portfolio");
    }

    #[test]
    fn test_slugify_caps_length() {
        let long = "a".repeat(200);
        assert_eq!(slugify(&long).len(), 80);
    }
}
