//! JSON HTTP API over the pipeline, interview and notification services.

pub mod dto;
mod error;
pub mod handlers;
mod state;

pub use error::AppError;
pub use state::{AppState, Backends, ServiceOptions};

use axum::{
    Router,
    routing::{get, post},
};

use handlers::{applications, health, interviews, queue};

/// Builds the API router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/applications",
            post(applications::handle_submit).get(applications::handle_list),
        )
        .route(
            "/api/v1/applications/ai-screening",
            post(applications::handle_screen_pending),
        )
        .route("/api/v1/applications/:id", get(applications::handle_get))
        .route(
            "/api/v1/applications/:id/audit",
            get(applications::handle_audit_trail),
        )
        .route(
            "/api/v1/applications/:id/emails",
            get(applications::handle_emails),
        )
        .route(
            "/api/v1/applications/:id/decision",
            post(applications::handle_decision),
        )
        .route(
            "/api/v1/applications/:id/ai-screening",
            post(applications::handle_ai_screening),
        )
        .route(
            "/api/v1/applications/:id/interview",
            post(applications::handle_schedule_interview),
        )
        .route(
            "/api/v1/applications/:id/offer",
            post(applications::handle_offer),
        )
        .route(
            "/api/v1/interviews/token/:token",
            get(interviews::handle_validate_token),
        )
        .route(
            "/api/v1/interviews/token/:token/complete",
            post(interviews::handle_complete),
        )
        .route(
            "/api/v1/email-queue/process",
            post(queue::handle_process_queue),
        )
        .with_state(state)
}
