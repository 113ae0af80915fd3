use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::tokens;
use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller. Present in a handler's signature means the
/// request carried a valid, unexpired access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let secret = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let row: Option<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.email
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.kind = $2 AND t.expires_at > now()
            "#,
        )
        .bind(tokens::hash_secret(secret))
        .bind(tokens::KIND_ACCESS)
        .fetch_optional(&state.db)
        .await?;

        let (id, email) = row.ok_or(AppError::Unauthorized)?;
        Ok(AuthUser { id, email })
    }
}
