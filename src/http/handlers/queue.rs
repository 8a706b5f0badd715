//! Email queue processing endpoint.

use axum::{Json, extract::State};

use crate::http::{AppError, AppState};
use crate::notification::services::QueueReport;

/// POST /api/v1/email-queue/process
pub async fn handle_process_queue(
    State(state): State<AppState>,
) -> Result<Json<QueueReport>, AppError> {
    Ok(Json(state.queue.process_due().await?))
}
