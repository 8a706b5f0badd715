//! Candidate portal token endpoints.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::http::{
    AppError, AppState,
    dto::{CompletionResponse, TokenValidationResponse},
};
use crate::interview::domain::TokenSecret;

/// GET /api/v1/interviews/token/:token
pub async fn handle_validate_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<TokenValidationResponse>, AppError> {
    let validation = state
        .completion
        .validate_token(&TokenSecret::from_presented(token))
        .await?;
    Ok(Json(TokenValidationResponse {
        valid: true,
        application_id: validation.application_id,
        interview_id: validation.interview_id,
        expires_at: validation.expires_at,
    }))
}

/// POST /api/v1/interviews/token/:token/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let completed = state
        .completion
        .complete(&TokenSecret::from_presented(token))
        .await?;
    Ok(Json(CompletionResponse::from(&completed)).into_response())
}
