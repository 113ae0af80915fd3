use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;

use crate::ai::OllamaClient;
use crate::config::Config;
use crate::export::temp_store::TempStore;
use crate::github::GithubClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub github: GithubClient,
    pub ollama: OllamaClient,
    /// Bounds concurrent enhancement calls across all export requests.
    pub enhancer_permits: Arc<Semaphore>,
    /// In-memory store for short-lived export download tokens.
    pub temp_store: TempStore,
    pub config: Config,
}
