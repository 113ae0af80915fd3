//! GitHub client, the single point of entry for all code-host API calls.
//!
//! User lookup failures are surfaced (the caller needs to distinguish a bad
//! login from an outage); every other endpoint degrades to empty/None so a
//! flaky upstream never aborts an ingestion run.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const BASE_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    #[error("GitHub API error: {0}")]
    Upstream(String),
}

impl From<GithubError> for crate::errors::AppError {
    fn from(e: GithubError) -> Self {
        match e {
            GithubError::UserNotFound(login) => {
                crate::errors::AppError::NotFound(format!("GitHub user '{login}' not found"))
            }
            GithubError::Upstream(msg) => crate::errors::AppError::GitHub(msg),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    content: Option<String>,
}

/// Authenticated GitHub API client. Cheap to clone; `with_user_token`
/// produces an independent client without touching the original.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    token: Option<String>,
}

impl GithubClient {
    /// Builds a client using the server-wide token (or anonymous access).
    pub fn new(server_token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent("openfolio-api")
                .build()
                .unwrap_or_default(),
            token: server_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Returns a new client that authenticates with the given user token,
    /// replacing any server-wide token. Returns an unchanged clone if the
    /// token is blank.
    pub fn with_user_token(&self, token: &str) -> GithubClient {
        if token.trim().is_empty() {
            return self.clone();
        }
        GithubClient {
            client: self.client.clone(),
            token: Some(token.to_string()),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    pub async fn fetch_user(&self, login: &str) -> Result<GithubUser, GithubError> {
        let response = self
            .client
            .get(format!("{BASE_URL}/users/{login}"))
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| GithubError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(GithubError::UserNotFound(login.to_string())),
            status if status.is_success() => response
                .json::<GithubUser>()
                .await
                .map_err(|e| GithubError::Upstream(e.to_string())),
            status => Err(GithubError::Upstream(format!(
                "GitHub API returned {status}"
            ))),
        }
    }

    /// Lists the user's public repos. Empty on any failure.
    pub async fn fetch_repos(&self, login: &str) -> Vec<GithubRepo> {
        let url = format!("{BASE_URL}/users/{login}/repos?per_page=100&type=public&sort=updated");
        match self.get_json::<Vec<GithubRepo>>(&url).await {
            Some(repos) => repos,
            None => {
                warn!("Failed to list repos for {login}; treating as empty");
                Vec::new()
            }
        }
    }

    /// Language byte counts for one repo, e.g. `{"Rust": 95000}`. Empty on failure.
    pub async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> HashMap<String, i64> {
        let url = format!("{BASE_URL}/repos/{owner}/{repo}/languages");
        self.get_json::<HashMap<String, i64>>(&url)
            .await
            .unwrap_or_default()
    }

    /// The profile README (the special `{login}/{login}` repo), decoded.
    pub async fn fetch_profile_readme(&self, login: &str) -> Option<String> {
        self.fetch_readme(&format!("{BASE_URL}/repos/{login}/{login}/readme"))
            .await
    }

    /// README for a specific repository, decoded.
    pub async fn fetch_repo_readme(&self, owner: &str, repo: &str) -> Option<String> {
        self.fetch_readme(&format!("{BASE_URL}/repos/{owner}/{repo}/readme"))
            .await
    }

    async fn fetch_readme(&self, url: &str) -> Option<String> {
        let response = self.get_json::<ReadmeResponse>(url).await?;
        decode_readme_content(response.content.as_deref()?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            debug!("GitHub GET {url} returned {}", response.status());
            return None;
        }
        response.json::<T>().await.ok()
    }
}

/// GitHub serves README content as base64 with embedded newlines.
fn decode_readme_content(content: &str) -> Option<String> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(cleaned).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_readme_strips_whitespace() {
        // "hello world" encoded with a newline split mid-stream
        let input = "aGVsbG8g\nd29ybGQ=";
        assert_eq!(decode_readme_content(input), Some("hello world".to_string()));
    }

    #[test]
    fn test_decode_readme_invalid_base64() {
        assert_eq!(decode_readme_content("not base64!!!"), None);
    }

    #[test]
    fn test_with_user_token_blank_is_noop() {
        let client = GithubClient::new(Some("server-token".to_string()));
        let same = client.with_user_token("   ");
        assert_eq!(same.token.as_deref(), Some("server-token"));

        let overridden = client.with_user_token("user-token");
        assert_eq!(overridden.token.as_deref(), Some("user-token"));
        // original unaffected
        assert_eq!(client.token.as_deref(), Some("server-token"));
    }
}
