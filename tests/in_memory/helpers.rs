//! Shared builders for in-memory adapter tests.

use mockable::DefaultClock;
use rstest::fixture;
use synchrohr::notification::domain::{EmailKind, EmailPayload, QueuedEmail};
use synchrohr::pipeline::domain::{
    ApplicantProfile, Application, ApplicationId, ApplicationSource, CandidateEmail,
    CandidateName,
};

/// Provides a clock for aggregate construction.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Builds a portal application for `name` and `email`.
///
/// # Errors
///
/// Returns an error when the contact details fail validation.
pub fn application(name: &str, email: &str) -> Result<Application, eyre::Report> {
    let profile = ApplicantProfile {
        candidate_name: CandidateName::new(name)?,
        email: CandidateEmail::new(email)?,
        phone: None,
        position_applied: "Platform Engineer".to_owned(),
        job_role_id: None,
        file_url: None,
        parsed_resume: None,
        source: ApplicationSource::Portal,
    };
    Ok(Application::submit(profile, &DefaultClock))
}

/// Builds a pending email for `application_id` due at `scheduled_for`.
#[must_use]
pub fn email(
    application_id: ApplicationId,
    kind: EmailKind,
    scheduled_for: chrono::DateTime<chrono::Utc>,
) -> QueuedEmail {
    let payload = EmailPayload {
        candidate_name: "Ada Lovelace".to_owned(),
        candidate_email: "ada@example.com".to_owned(),
        job_title: "Platform Engineer".to_owned(),
        interview_link: None,
        scheduled_for: None,
        token_expiry: None,
    };
    QueuedEmail::new(application_id, kind, payload, scheduled_for, &DefaultClock)
}
