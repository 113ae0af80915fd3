use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub github_token: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    pub linkedin_client_id: Option<String>,
    pub linkedin_client_secret: Option<String>,
    pub ollama_url: String,
    pub ollama_model: String,
    pub pdf_command: String,
    pub public_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            github_client_id: std::env::var("GITHUB_CLIENT_ID").ok(),
            github_client_secret: std::env::var("GITHUB_CLIENT_SECRET").ok(),
            linkedin_client_id: std::env::var("LINKEDIN_CLIENT_ID").ok(),
            linkedin_client_secret: std::env::var("LINKEDIN_CLIENT_SECRET").ok(),
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| "qwen2.5:14b".to_string()),
            pdf_command: std::env::var("PDF_COMMAND").unwrap_or_else(|_| "weasyprint".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            access_token_ttl_secs: env_i64("ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl_secs: env_i64("REFRESH_TOKEN_TTL_SECS", 2_592_000)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_i64(key: &str, default: i64) -> Result<i64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<i64>()
            .with_context(|| format!("'{key}' must be an integer number of seconds")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_i64_default_and_override() {
        assert_eq!(env_i64("OPENFOLIO_TTL_TEST_UNSET", 3600).unwrap(), 3600);

        std::env::set_var("OPENFOLIO_TTL_TEST_SET", "120");
        assert_eq!(env_i64("OPENFOLIO_TTL_TEST_SET", 3600).unwrap(), 120);
        std::env::remove_var("OPENFOLIO_TTL_TEST_SET");

        std::env::set_var("OPENFOLIO_TTL_TEST_BAD", "soon");
        assert!(env_i64("OPENFOLIO_TTL_TEST_BAD", 3600).is_err());
        std::env::remove_var("OPENFOLIO_TTL_TEST_BAD");
    }
}
