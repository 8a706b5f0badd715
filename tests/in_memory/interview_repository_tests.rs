//! In-memory integration tests for the interview repository contract.

use chrono::{Duration, Utc};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use synchrohr::interview::{
    adapters::memory::InMemoryInterviewRepository,
    domain::{Interview, InterviewId, InterviewStatus, InterviewToken, TokenSecret},
    ports::{InterviewRepository, InterviewRepositoryError},
};
use synchrohr::pipeline::domain::ApplicationId;

struct Invitation {
    interview: Interview,
    token: InterviewToken,
    secret: TokenSecret,
}

#[fixture]
fn invitation() -> Invitation {
    let application_id = ApplicationId::new();
    let secret = TokenSecret::generate();
    let interview = Interview::schedule(
        InterviewId::new(),
        application_id,
        "Ada Lovelace",
        Utc::now() + Duration::hours(1),
        format!("http://localhost:8080/interview/login?token={}", secret.as_str()),
        &DefaultClock,
    );
    let token = InterviewToken::issue(
        application_id,
        interview.id(),
        &secret,
        Duration::hours(49),
        &DefaultClock,
    );
    Invitation {
        interview,
        token,
        secret,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tokens_are_found_by_digest_only(invitation: Invitation) -> eyre::Result<()> {
    let repo = InMemoryInterviewRepository::new();
    repo.store_invitation(&invitation.interview, &invitation.token)
        .await?;

    let found = repo
        .find_token_by_digest(&invitation.secret.digest())
        .await?;
    let other = repo
        .find_token_by_digest(&TokenSecret::generate().digest())
        .await?;

    ensure!(found.as_ref() == Some(&invitation.token));
    ensure!(other.is_none());
    ensure!(repo.find_interview(invitation.interview.id()).await? == Some(invitation.interview));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consuming_a_token_succeeds_once(invitation: Invitation) -> eyre::Result<()> {
    let repo = InMemoryInterviewRepository::new();
    repo.store_invitation(&invitation.interview, &invitation.token)
        .await?;

    let first = repo.consume_token(invitation.token.id(), Utc::now()).await?;
    let second = repo.consume_token(invitation.token.id(), Utc::now()).await?;

    ensure!(first);
    ensure!(!second);
    let stored = repo
        .find_token_by_digest(&invitation.secret.digest())
        .await?
        .ok_or_else(|| eyre::eyre!("token should exist"))?;
    ensure!(stored.used_at().is_some());
    ensure!(stored.interview_completed());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interview_updates_require_an_existing_interview(
    invitation: Invitation,
) -> eyre::Result<()> {
    let repo = InMemoryInterviewRepository::new();
    let mut interview = invitation.interview;
    interview.complete(&DefaultClock)?;

    let missing = repo.update_interview(&interview).await;
    repo.store_invitation(&interview, &invitation.token).await?;
    repo.update_interview(&interview).await?;

    ensure!(matches!(missing, Err(InterviewRepositoryError::NotFound(_))));
    let stored = repo
        .find_interview(interview.id())
        .await?
        .ok_or_else(|| eyre::eyre!("interview should exist"))?;
    ensure!(stored.status() == InterviewStatus::Completed);
    Ok(())
}
