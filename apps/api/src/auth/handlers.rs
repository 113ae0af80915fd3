use anyhow::anyhow;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::oauth::{self, OAuthProfile, OAuthProvider};
use crate::auth::tokens::{self, TokenResponse};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::response::ApiResponse;
use crate::state::AppState;

const PROVIDER_EMAIL: &str = "EMAIL";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCallbackRequest {
    pub code: String,
    pub redirect_uri: Option<String>,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), AppError> {
    let email = normalize_email(&req.email)?;
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user: UserRow = sqlx::query_as(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING *",
    )
    .bind(&email)
    .bind(&req.display_name)
    .fetch_one(&state.db)
    .await?;

    let password_hash = hash_password(&req.password)?;
    sqlx::query(
        "INSERT INTO auth_identities (user_id, provider, provider_uid, access_token) VALUES ($1, $2, $3, $4)",
    )
    .bind(user.id)
    .bind(PROVIDER_EMAIL)
    .bind(&email)
    .bind(&password_hash)
    .execute(&state.db)
    .await?;

    let response = tokens::issue_tokens(&state.db, &user, &state.config).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let email = normalize_email(&req.email)?;

    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let stored_hash: Option<String> = sqlx::query_scalar(
        "SELECT access_token FROM auth_identities WHERE user_id = $1 AND provider = $2",
    )
    .bind(user.id)
    .bind(PROVIDER_EMAIL)
    .fetch_optional(&state.db)
    .await?
    .flatten();

    let stored_hash = stored_hash.ok_or(AppError::Unauthorized)?;
    verify_password(&req.password, &stored_hash)?;

    let response = tokens::issue_tokens(&state.db, &user, &state.config).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let user = tokens::consume_refresh_token(&state.db, &req.refresh_token).await?;
    let response = tokens::issue_tokens(&state.db, &user, &state.config).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/v1/auth/oauth/:provider
pub async fn handle_oauth(
    State(state): State<AppState>,
    Path(provider_key): Path<String>,
    Json(req): Json<OAuthCallbackRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let provider = OAuthProvider::parse(&provider_key)?;
    let access_token =
        oauth::exchange_code_for_token(provider, &state.config, &req.code, req.redirect_uri.as_deref())
            .await?;
    let profile = oauth::fetch_profile(provider, &access_token).await?;

    let user = link_oauth_identity(&state.db, provider, &profile, &access_token).await?;
    info!("OAuth login via {} for user {}", provider.as_str(), user.id);

    let response = tokens::issue_tokens(&state.db, &user, &state.config).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/v1/users/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserRow>>, AppError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(ApiResponse::new(user)))
}

/// Finds or creates the user for an OAuth identity, refreshing the stored
/// upstream token and any profile fields we learned.
async fn link_oauth_identity(
    db: &PgPool,
    provider: OAuthProvider,
    profile: &OAuthProfile,
    access_token: &str,
) -> Result<UserRow, AppError> {
    let existing_user_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT user_id FROM auth_identities WHERE provider = $1 AND provider_uid = $2",
    )
    .bind(provider.as_str())
    .bind(&profile.provider_uid)
    .fetch_optional(db)
    .await?;

    let user_id = match existing_user_id {
        Some(user_id) => {
            sqlx::query(
                "UPDATE auth_identities SET access_token = $3 WHERE provider = $1 AND provider_uid = $2",
            )
            .bind(provider.as_str())
            .bind(&profile.provider_uid)
            .bind(access_token)
            .execute(db)
            .await?;
            user_id
        }
        None => {
            // GitHub may withhold the email; fall back to the noreply form.
            let email = profile
                .email
                .clone()
                .or_else(|| {
                    profile
                        .login
                        .as_ref()
                        .map(|l| format!("{l}@users.noreply.github.com"))
                })
                .ok_or_else(|| {
                    AppError::Validation("OAuth profile carries no usable email".to_string())
                })?
                .to_lowercase();
            let name = profile.display_name.clone().or_else(|| profile.login.clone());

            let user_id: Uuid = match sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
                .bind(&email)
                .fetch_optional(db)
                .await?
            {
                Some(id) => id,
                None => {
                    sqlx::query_scalar(
                        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(&email)
                    .bind(&name)
                    .fetch_one(db)
                    .await?
                }
            };

            sqlx::query(
                "INSERT INTO auth_identities (user_id, provider, provider_uid, access_token) VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(provider.as_str())
            .bind(&profile.provider_uid)
            .bind(access_token)
            .execute(db)
            .await?;
            user_id
        }
    };

    if provider == OAuthProvider::Github {
        if let Some(login) = &profile.login {
            sqlx::query("UPDATE users SET github_username = $2 WHERE id = $1")
                .bind(user_id)
                .bind(login)
                .execute(db)
                .await?;
        }
    }
    if let Some(avatar) = &profile.avatar_url {
        sqlx::query("UPDATE users SET avatar_url = $2 WHERE id = $1")
            .bind(user_id)
            .bind(avatar)
            .execute(db)
            .await?;
    }
    if let Some(name) = &profile.display_name {
        sqlx::query(
            "UPDATE users SET display_name = $2 WHERE id = $1 AND (display_name IS NULL OR display_name = '')",
        )
        .bind(user_id)
        .bind(name)
        .execute(db)
        .await?;
    }

    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(user)
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AppError::Unauthorized)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_folds_case() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("   ").is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }
}
