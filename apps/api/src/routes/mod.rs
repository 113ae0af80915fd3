pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;
use crate::{auth, export, ingestion, items, portfolio, resume};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/refresh", post(auth::handlers::handle_refresh))
        .route("/api/v1/auth/oauth/:provider", post(auth::handlers::handle_oauth))
        .route("/api/v1/users/me", get(auth::handlers::handle_me))
        // Ingestion
        .route("/api/v1/ingestion/github", post(ingestion::handlers::handle_ingest_github))
        // Portfolios
        .route(
            "/api/v1/portfolios",
            get(portfolio::handlers::handle_list).post(portfolio::handlers::handle_create),
        )
        .route(
            "/api/v1/portfolios/:id",
            patch(portfolio::handlers::handle_update).delete(portfolio::handlers::handle_delete),
        )
        .route("/api/v1/portfolios/:id/projects", get(portfolio::handlers::handle_list_projects))
        .route("/api/v1/portfolios/:id/skills", get(portfolio::handlers::handle_list_skills))
        .route(
            "/api/v1/portfolios/:id/publish",
            post(portfolio::handlers::handle_publish).delete(portfolio::handlers::handle_unpublish),
        )
        .route("/api/v1/portfolios/:id/preview", get(export::handlers::handle_preview))
        // Portfolio child items
        .route(
            "/api/v1/portfolios/:id/experiences",
            get(items::handlers::handle_list_experiences)
                .post(items::handlers::handle_create_experience),
        )
        .route(
            "/api/v1/experiences/:id",
            put(items::handlers::handle_update_experience)
                .delete(items::handlers::handle_delete_experience),
        )
        .route(
            "/api/v1/portfolios/:id/education",
            get(items::handlers::handle_list_education)
                .post(items::handlers::handle_create_education),
        )
        .route(
            "/api/v1/education/:id",
            put(items::handlers::handle_update_education)
                .delete(items::handlers::handle_delete_education),
        )
        .route(
            "/api/v1/portfolios/:id/certifications",
            get(items::handlers::handle_list_certifications)
                .post(items::handlers::handle_create_certification),
        )
        .route(
            "/api/v1/certifications/:id",
            put(items::handlers::handle_update_certification)
                .delete(items::handlers::handle_delete_certification),
        )
        // Export
        .route("/api/v1/portfolios/:id/export/pdf", post(export::handlers::handle_export_pdf))
        .route(
            "/api/v1/portfolios/:id/export/pdf/inline",
            post(export::handlers::handle_export_pdf_inline),
        )
        .route(
            "/api/v1/portfolios/:id/export/preview",
            get(export::handlers::handle_export_preview),
        )
        .route("/api/v1/portfolios/:id/export/ai-status", get(export::handlers::handle_ai_status))
        .route("/api/v1/portfolios/:id/export/warm-ai", post(export::handlers::handle_warm_ai))
        .route("/api/v1/portfolios/:id/export/save", post(export::handlers::handle_export_save))
        .route("/api/v1/export/download/:token", get(export::handlers::handle_download))
        // Saved resumes
        .route("/api/v1/saved-resumes", get(export::handlers::handle_list_saved))
        .route("/api/v1/saved-resumes/:id", delete(export::handlers::handle_delete_saved))
        .route("/api/v1/saved-resumes/:id/pdf", get(export::handlers::handle_download_saved))
        .route("/api/v1/saved-resumes/:id/base64", get(export::handlers::handle_saved_base64))
        .route(
            "/api/v1/saved-resumes/:id/publish",
            post(export::handlers::handle_publish_saved)
                .delete(export::handlers::handle_unpublish_saved),
        )
        // Resume builder
        .route(
            "/api/v1/resumes",
            get(resume::handlers::handle_list).post(resume::handlers::handle_create),
        )
        .route("/api/v1/resumes/templates", get(resume::handlers::handle_templates))
        .route(
            "/api/v1/resumes/:id",
            get(resume::handlers::handle_get)
                .patch(resume::handlers::handle_update)
                .delete(resume::handlers::handle_delete),
        )
        .route("/api/v1/resumes/:id/preview", get(resume::handlers::handle_preview))
        .route(
            "/api/v1/resumes/:id/preview/:template_key",
            get(resume::handlers::handle_preview_with_template),
        )
        .route("/api/v1/resumes/:id/pdf", post(resume::handlers::handle_pdf))
        .route("/api/v1/resumes/:id/pdf/inline", get(resume::handlers::handle_pdf_inline))
        // Public, no auth
        .route("/api/v1/public/resume/:token", get(export::handlers::handle_public_resume))
        .route("/api/v1/public/:slug", get(export::handlers::handle_public_portfolio))
        .route("/api/v1/public/:slug/meta", get(export::handlers::handle_public_meta))
        .with_state(state)
}
