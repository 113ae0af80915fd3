use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::ingestion::pipeline::{self, PortfolioSummary};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionRequest {
    pub external_login: String,
}

/// POST /api/v1/ingestion/github
pub async fn handle_ingest_github(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<IngestionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PortfolioSummary>>), AppError> {
    let login = req.external_login.trim();
    if login.is_empty() {
        return Err(AppError::Validation(
            "externalLogin must not be empty".to_string(),
        ));
    }
    let summary = pipeline::ingest_from_github(&state, user.id, login).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(summary))))
}
