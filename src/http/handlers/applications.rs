//! Application intake, screening and pipeline actions.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::parse_application_id;
use crate::http::{
    AppError, AppState,
    dto::{
        AiScreeningResponse, ApplicationView, DecisionBody, DecisionResponse, ListQuery,
        OfferBody, PendingScreeningView, ScheduleBody, ScheduleResponse, SubmitApplicationBody,
    },
};
use crate::pipeline::{
    domain::{ApplicationSource, ScreeningDecision, ScreeningStatus},
    ports::JobContext,
    services::{AiScreeningService, SubmitApplicationRequest},
};
use mockable::DefaultClock;
use std::sync::Arc;

/// POST /api/v1/applications
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitApplicationBody>,
) -> Result<Response, AppError> {
    let source = body
        .source
        .as_deref()
        .map(ApplicationSource::try_from)
        .transpose()
        .map_err(|err| AppError::Validation(err.to_string()))?
        .unwrap_or(ApplicationSource::Portal);

    let mut request =
        SubmitApplicationRequest::new(body.candidate_name, body.email, body.position_applied)
            .with_source(source);
    if let Some(phone) = body.phone {
        request = request.with_phone(phone);
    }
    if let Some(job_role_id) = body.job_role_id {
        request = request.with_job_role_id(job_role_id);
    }
    if let Some(file_url) = body.file_url {
        request = request.with_file_url(file_url);
    }
    if let Some(parsed_resume) = body.parsed_resume {
        request = request.with_parsed_resume(parsed_resume);
    }

    let application = state.applications.submit(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationView::from(&application)),
    )
        .into_response())
}

/// GET /api/v1/applications?status=
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let status = query
        .status
        .as_deref()
        .map(ScreeningStatus::try_from)
        .transpose()
        .map_err(|err| AppError::Validation(err.to_string()))?;
    let applications = state.applications.list(status).await?;
    let views: Vec<ApplicationView<'_>> = applications.iter().map(ApplicationView::from).collect();
    Ok(Json(views).into_response())
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let application = state.applications.find(parse_application_id(&id)?).await?;
    Ok(Json(ApplicationView::from(&application)).into_response())
}

/// GET /api/v1/applications/:id/audit
pub async fn handle_audit_trail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let entries = state
        .applications
        .audit_trail(parse_application_id(&id)?)
        .await?;
    Ok(Json(entries).into_response())
}

/// GET /api/v1/applications/:id/emails
pub async fn handle_emails(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let application_id = parse_application_id(&id)?;
    state.applications.find(application_id).await?;
    let emails = state.emails.list_for_application(application_id).await?;
    Ok(Json(emails).into_response())
}

/// POST /api/v1/applications/:id/decision
pub async fn handle_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Response, AppError> {
    let application_id = parse_application_id(&id)?;
    let decision = ScreeningDecision::try_from(body.decision.as_str())
        .map_err(|err| AppError::Validation(err.to_string()))?;
    let outcome = state
        .screening
        .decide(application_id, decision, body.performed_by)
        .await?;
    Ok(Json(DecisionResponse::from(&outcome)).into_response())
}

/// POST /api/v1/applications/:id/ai-screening
pub async fn handle_ai_screening(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<JobContext>>,
) -> Result<Response, AppError> {
    let application_id = parse_application_id(&id)?;
    let service = ai_screening(&state)?;
    let job = body.map(|Json(job)| job).unwrap_or_default();
    let outcome = service.screen(application_id, &job).await?;
    Ok(Json(AiScreeningResponse::from(&outcome)).into_response())
}

/// POST /api/v1/applications/ai-screening
pub async fn handle_screen_pending(
    State(state): State<AppState>,
    body: Option<Json<JobContext>>,
) -> Result<Response, AppError> {
    let service = ai_screening(&state)?;
    let job = body.map(|Json(job)| job).unwrap_or_default();
    let results = service.screen_pending(&job).await?;
    let views: Vec<PendingScreeningView> = results.iter().map(PendingScreeningView::from).collect();
    Ok(Json(views).into_response())
}

/// POST /api/v1/applications/:id/interview
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ScheduleBody>>,
) -> Result<Response, AppError> {
    let application_id = parse_application_id(&id)?;
    let delay_hours = body.and_then(|Json(schedule)| schedule.delay_hours);
    let scheduled = state
        .scheduler
        .schedule(application_id, delay_hours)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse::from(&scheduled)),
    )
        .into_response())
}

/// POST /api/v1/applications/:id/offer
pub async fn handle_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<OfferBody>>,
) -> Result<Response, AppError> {
    let application_id = parse_application_id(&id)?;
    let performed_by = body.and_then(|Json(offer)| offer.performed_by);
    let application = state
        .screening
        .extend_offer(application_id, performed_by)
        .await?;
    Ok(Json(ApplicationView::from(&application)).into_response())
}

fn ai_screening(state: &AppState) -> Result<Arc<AiScreeningService<DefaultClock>>, AppError> {
    state
        .ai_screening
        .clone()
        .ok_or_else(|| AppError::Unavailable("AI screening is not configured".to_owned()))
}
