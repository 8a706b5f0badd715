//! Invitation storage and single-use tokens against `PostgreSQL`.

use super::helpers::{TestDatabase, stored_application, test_runtime};
use chrono::{Duration, Utc};
use eyre::ensure;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use synchrohr::interview::{
    adapters::postgres::PostgresInterviewRepository,
    domain::{Interview, InterviewId, InterviewStatus, InterviewToken, TokenSecret},
    ports::InterviewRepository,
};
use synchrohr::pipeline::domain::ApplicationId;

fn invitation(application_id: ApplicationId) -> (Interview, InterviewToken, TokenSecret) {
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
    (interview, token, secret)
}

#[rstest]
fn a_token_is_consumed_exactly_once(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresInterviewRepository::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let (interview, token, secret) = invitation(candidate.id());
        repo.store_invitation(&interview, &token).await?;

        let used_at = Utc::now();
        let (first, second, third) = tokio::join!(
            repo.consume_token(token.id(), used_at),
            repo.consume_token(token.id(), used_at),
            repo.consume_token(token.id(), used_at),
        );

        let consumed = [first?, second?, third?]
            .into_iter()
            .filter(|won| *won)
            .count();
        ensure!(consumed == 1, "expected one consumption, got {consumed}");
        let stored = repo
            .find_token_by_digest(&secret.digest())
            .await?
            .ok_or_else(|| eyre::eyre!("token should exist"))?;
        ensure!(stored.used_at().is_some());
        ensure!(stored.interview_completed());
        ensure!(!repo.consume_token(token.id(), Utc::now()).await?);
        Ok(())
    })
}

#[rstest]
fn invitations_round_trip_through_the_store(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresInterviewRepository::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let (mut interview, token, secret) = invitation(candidate.id());
        repo.store_invitation(&interview, &token).await?;

        let found = repo
            .find_token_by_digest(&secret.digest())
            .await?
            .ok_or_else(|| eyre::eyre!("token should exist"))?;
        ensure!(found.id() == token.id());
        ensure!(found.interview_id() == interview.id());
        ensure!(found.used_at().is_none());
        ensure!(
            repo.find_token_by_digest(&TokenSecret::generate().digest())
                .await?
                .is_none()
        );

        interview.complete(&DefaultClock)?;
        repo.update_interview(&interview).await?;
        let stored = repo
            .find_interview(interview.id())
            .await?
            .ok_or_else(|| eyre::eyre!("interview should exist"))?;
        ensure!(stored.status() == InterviewStatus::Completed);
        ensure!(stored.completed_at().is_some());
        Ok(())
    })
}
