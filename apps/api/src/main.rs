mod ai;
mod auth;
mod config;
mod db;
mod errors;
mod export;
mod github;
mod ingestion;
mod items;
mod models;
mod portfolio;
mod render;
mod response;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::OllamaClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::export::temp_store::TempStore;
use crate::github::GithubClient;
use crate::routes::build_router;
use crate::state::AppState;

/// Default filter directive. Uses the crate name (underscored), which is
/// what tracing targets carry; the package name with its hyphen matches
/// no module path.
fn default_log_directive(level: &str) -> String {
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OpenFolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize GitHub client (server token is optional; unauthenticated
    // requests just get a lower rate limit)
    let github = GithubClient::new(config.github_token.clone());
    info!("GitHub client initialized");

    // Initialize Ollama client
    let ollama = OllamaClient::new(config.ollama_url.clone(), config.ollama_model.clone());
    info!("Ollama client initialized (model: {})", config.ollama_model);

    let state = AppState {
        db,
        github,
        ollama,
        enhancer_permits: Arc::new(Semaphore::new(export::service::ENHANCER_CONCURRENCY)),
        temp_store: TempStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_directive_matches_module_paths() {
        let directive = default_log_directive("info");
        assert_eq!(directive, "openfolio_api=info");
        // a hyphenated package name would enable nothing
        assert!(!directive.contains('-'));
    }
}
