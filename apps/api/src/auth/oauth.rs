//! OAuth code exchange against a closed set of upstream providers.

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;
use crate::errors::AppError;

const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";
const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const LINKEDIN_USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Github,
    Linkedin,
}

impl OAuthProvider {
    pub fn parse(key: &str) -> Result<Self, AppError> {
        match key.to_ascii_lowercase().as_str() {
            "github" => Ok(OAuthProvider::Github),
            "linkedin" => Ok(OAuthProvider::Linkedin),
            other => Err(AppError::Validation(format!(
                "Unknown OAuth provider: {other}"
            ))),
        }
    }

    /// Stored in `auth_identities.provider`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Github => "GITHUB",
            OAuthProvider::Linkedin => "LINKEDIN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider_uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub login: Option<String>,
}

pub async fn exchange_code_for_token(
    provider: OAuthProvider,
    config: &Config,
    code: &str,
    redirect_uri: Option<&str>,
) -> Result<String, AppError> {
    let (url, client_id, client_secret) = match provider {
        OAuthProvider::Github => (
            GITHUB_TOKEN_URL,
            config.github_client_id.as_deref(),
            config.github_client_secret.as_deref(),
        ),
        OAuthProvider::Linkedin => (
            LINKEDIN_TOKEN_URL,
            config.linkedin_client_id.as_deref(),
            config.linkedin_client_secret.as_deref(),
        ),
    };
    let (client_id, client_secret) = match (client_id, client_secret) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
            return Err(AppError::Validation(format!(
                "OAuth provider {} is not configured",
                provider.as_str()
            )))
        }
    };

    let body = json!({
        "client_id": client_id,
        "client_secret": client_secret,
        "code": code,
        "redirect_uri": redirect_uri.unwrap_or(""),
    });

    let response: Value = http_client()
        .post(url)
        .header("Accept", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::GitHub(format!("OAuth token exchange failed: {e}")))?
        .json()
        .await
        .map_err(|e| AppError::GitHub(format!("OAuth token response malformed: {e}")))?;

    response
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

pub async fn fetch_profile(
    provider: OAuthProvider,
    access_token: &str,
) -> Result<OAuthProfile, AppError> {
    match provider {
        OAuthProvider::Github => fetch_github_profile(access_token).await,
        OAuthProvider::Linkedin => fetch_linkedin_profile(access_token).await,
    }
}

async fn fetch_github_profile(access_token: &str) -> Result<OAuthProfile, AppError> {
    let user: Value = http_client()
        .get(GITHUB_USER_URL)
        .header("Authorization", format!("Bearer {access_token}"))
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await
        .map_err(|e| AppError::GitHub(format!("GitHub profile fetch failed: {e}")))?
        .json()
        .await
        .map_err(|e| AppError::GitHub(format!("GitHub profile malformed: {e}")))?;

    let provider_uid = user
        .get("id")
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::GitHub("GitHub user profile is empty".to_string()))?;

    Ok(OAuthProfile {
        provider_uid,
        email: string_field(&user, "email"),
        display_name: string_field(&user, "name"),
        avatar_url: string_field(&user, "avatar_url"),
        login: string_field(&user, "login"),
    })
}

async fn fetch_linkedin_profile(access_token: &str) -> Result<OAuthProfile, AppError> {
    let user: Value = http_client()
        .get(LINKEDIN_USERINFO_URL)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(|e| AppError::GitHub(format!("LinkedIn profile fetch failed: {e}")))?
        .json()
        .await
        .map_err(|e| AppError::GitHub(format!("LinkedIn profile malformed: {e}")))?;

    let provider_uid = string_field(&user, "sub")
        .ok_or_else(|| AppError::GitHub("LinkedIn user profile is empty".to_string()))?;

    Ok(OAuthProfile {
        provider_uid,
        email: string_field(&user, "email"),
        display_name: string_field(&user, "name"),
        avatar_url: string_field(&user, "picture"),
        login: None,
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_case_insensitive() {
        assert_eq!(OAuthProvider::parse("GitHub").ok(), Some(OAuthProvider::Github));
        assert_eq!(OAuthProvider::parse("LINKEDIN").ok(), Some(OAuthProvider::Linkedin));
        assert!(OAuthProvider::parse("gitlab").is_err());
    }
}
