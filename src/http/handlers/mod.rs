//! Route handlers.

pub mod applications;
pub mod health;
pub mod interviews;
pub mod queue;

use crate::http::AppError;
use crate::pipeline::domain::ApplicationId;
use uuid::Uuid;

fn parse_application_id(raw: &str) -> Result<ApplicationId, AppError> {
    Uuid::parse_str(raw.trim())
        .map(ApplicationId::from_uuid)
        .map_err(|_| AppError::Validation(format!("invalid application id '{raw}'")))
}
