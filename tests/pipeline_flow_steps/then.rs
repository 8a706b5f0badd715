//! Then steps for candidate pipeline BDD scenarios.

use super::world::{PipelineWorld, run_async};
use rstest_bdd_macros::then;
use synchrohr::interview::{domain::InterviewDomainError, services::InterviewServiceError};
use synchrohr::notification::{
    domain::{EmailKind, EmailStatus},
    ports::EmailQueueRepository,
};
use synchrohr::pipeline::{
    domain::{PipelineDomainError, PipelineStage},
    services::ApplicationServiceError,
};

#[then(r#"the application stage is "{stage}""#)]
fn application_stage_is(world: &PipelineWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = PipelineStage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;
    let application = run_async(world.state.applications.find(world.application_id()?))?;

    if application.stage() != expected {
        return Err(eyre::eyre!(
            "expected stage {}, found {}",
            expected.as_str(),
            application.stage().as_str()
        ));
    }
    Ok(())
}

#[then(r#"{count:usize} "{kind}" email has been delivered"#)]
fn emails_delivered(world: &PipelineWorld, count: usize, kind: String) -> Result<(), eyre::Report> {
    let expected_kind = EmailKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid email kind in scenario: {err}"))?;
    let delivered = world.gateway.count_of(expected_kind);

    if delivered != count {
        return Err(eyre::eyre!(
            "expected {count} {expected_kind} emails, found {delivered}"
        ));
    }
    Ok(())
}

#[then("no email has been delivered")]
fn no_email_delivered(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let sent = world.gateway.sent();
    if !sent.is_empty() {
        return Err(eyre::eyre!("expected no deliveries, found {}", sent.len()));
    }
    Ok(())
}

#[then("an interview invitation is queued")]
fn invitation_queued(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let emails = run_async(world.state.emails.list_for_application(world.application_id()?))?;
    let queued = emails.iter().any(|email| {
        email.kind() == EmailKind::InterviewScheduled && email.status() == EmailStatus::Pending
    });

    if !queued {
        return Err(eyre::eyre!("expected a pending interview invitation"));
    }
    Ok(())
}

#[then("the completion fails because the token was already used")]
fn completion_fails_token_used(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing completion result"))?;

    if !matches!(
        result,
        Err(InterviewServiceError::Interview(
            InterviewDomainError::TokenAlreadyUsed
        ))
    ) {
        return Err(eyre::eyre!("expected TokenAlreadyUsed error, got {result:?}"));
    }
    Ok(())
}

#[then("the decision fails with an invalid stage transition")]
fn decision_fails_invalid_transition(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_decision
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing decision result"))?;

    if !matches!(
        result,
        Err(ApplicationServiceError::Domain(
            PipelineDomainError::InvalidStageTransition { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidStageTransition error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the decision fails because the application is demo data")]
fn decision_fails_demo(world: &PipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_decision
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing decision result"))?;

    if !matches!(
        result,
        Err(ApplicationServiceError::Domain(
            PipelineDomainError::DemoApplication(_)
        ))
    ) {
        return Err(eyre::eyre!("expected DemoApplication error, got {result:?}"));
    }
    Ok(())
}
