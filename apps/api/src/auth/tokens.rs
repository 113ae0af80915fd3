//! Opaque bearer tokens. The raw secret goes to the client once; only a
//! SHA-256 hex digest is stored, so a leaked database cannot mint sessions.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::UserRow;

const SECRET_LENGTH: usize = 48;

pub const KIND_ACCESS: &str = "access";
pub const KIND_REFRESH: &str = "refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in_ms: i64,
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub github_username: Option<String>,
}

/// Generates a cryptographically random alphanumeric secret.
pub fn generate_secret(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mints a fresh access/refresh pair for the user. TTLs come from
/// `ACCESS_TOKEN_TTL_SECS` / `REFRESH_TOKEN_TTL_SECS`.
pub async fn issue_tokens(
    db: &PgPool,
    user: &UserRow,
    config: &Config,
) -> Result<TokenResponse, AppError> {
    let access = generate_secret(SECRET_LENGTH);
    let refresh = generate_secret(SECRET_LENGTH);
    let access_expires = Utc::now() + Duration::seconds(config.access_token_ttl_secs);
    let refresh_expires = Utc::now() + Duration::seconds(config.refresh_token_ttl_secs);

    insert_token(db, user.id, &access, KIND_ACCESS, access_expires).await?;
    insert_token(db, user.id, &refresh, KIND_REFRESH, refresh_expires).await?;

    Ok(TokenResponse {
        access_token: access,
        refresh_token: refresh,
        expires_in_ms: config.access_token_ttl_secs * 1000,
        user_id: user.id,
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        github_username: user.github_username.clone(),
    })
}

async fn insert_token(
    db: &PgPool,
    user_id: Uuid,
    secret: &str,
    kind: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO auth_tokens (user_id, token_hash, kind, expires_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(hash_secret(secret))
    .bind(kind)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Validates and consumes a refresh token (single use), returning its user.
pub async fn consume_refresh_token(db: &PgPool, refresh: &str) -> Result<UserRow, AppError> {
    let hash = hash_secret(refresh);
    let user_id: Option<Uuid> = sqlx::query_scalar(
        "DELETE FROM auth_tokens WHERE token_hash = $1 AND kind = $2 AND expires_at > now() RETURNING user_id",
    )
    .bind(&hash)
    .bind(KIND_REFRESH)
    .fetch_optional(db)
    .await?;

    let user_id = user_id.ok_or(AppError::Unauthorized)?;
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = generate_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_secret_is_random() {
        assert_ne!(generate_secret(48), generate_secret(48));
    }

    #[test]
    fn test_hash_secret_is_deterministic_hex() {
        let a = hash_secret("some-token");
        let b = hash_secret("some-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, hash_secret("other-token"));
    }
}
