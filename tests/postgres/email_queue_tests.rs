//! Delivery claims on the email queue against `PostgreSQL`.

use super::helpers::{TestDatabase, stored_application, test_runtime};
use chrono::{DateTime, Duration, Utc};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use synchrohr::notification::{
    adapters::postgres::PostgresEmailQueue,
    domain::{DeliveryWindow, EmailKind, EmailPayload, EmailStatus, QueuedEmail, QueuedEmailId},
    ports::{EmailQueueError, EmailQueueRepository},
};
use synchrohr::pipeline::domain::Application;

fn window_at(now: DateTime<Utc>) -> DeliveryWindow {
    DeliveryWindow {
        now,
        max_retries: 3,
        stale_before: now - Duration::minutes(5),
    }
}

fn queued_for(application: &Application, scheduled_for: DateTime<Utc>) -> QueuedEmail {
    let payload = EmailPayload::for_application(application, application.job_title());
    QueuedEmail::new(
        application.id(),
        EmailKind::Selection,
        payload,
        scheduled_for,
        &DefaultClock,
    )
}

#[rstest]
fn concurrent_claims_have_a_single_winner(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let queue = PostgresEmailQueue::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let now = Utc::now();
        let email = queued_for(&candidate, now - Duration::minutes(1));
        queue.enqueue(&email).await?;

        let (first, second, third) = tokio::join!(
            queue.claim(email.id(), window_at(now)),
            queue.claim(email.id(), window_at(now)),
            queue.claim(email.id(), window_at(now)),
        );

        let claims: Vec<QueuedEmail> = [first?, second?, third?].into_iter().flatten().collect();
        let [claimed] = claims.as_slice() else {
            bail!("expected one claim, got {}", claims.len());
        };
        ensure!(claimed.status() == EmailStatus::Sending);
        ensure!(claimed.claimed_at().is_some());
        ensure!(queue.find_due(window_at(now), 10).await?.is_empty());
        Ok(())
    })
}

#[rstest]
fn an_abandoned_claim_is_taken_over(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let queue = PostgresEmailQueue::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let now = Utc::now();
        let email = queued_for(&candidate, now - Duration::hours(1));
        queue.enqueue(&email).await?;

        let abandoned = window_at(now - Duration::minutes(10));
        ensure!(queue.claim(email.id(), abandoned).await?.is_some());
        let patient = DeliveryWindow {
            stale_before: now - Duration::minutes(15),
            ..window_at(now)
        };
        ensure!(queue.claim(email.id(), patient).await?.is_none());

        ensure!(queue.claim(email.id(), window_at(now)).await?.is_some());
        ensure!(queue.claim(email.id(), window_at(now)).await?.is_none());
        Ok(())
    })
}

#[rstest]
fn outcomes_are_only_written_under_a_claim(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let queue = PostgresEmailQueue::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let now = Utc::now();
        let mut email = queued_for(&candidate, now - Duration::minutes(1));
        queue.enqueue(&email).await?;

        email.mark_sent(&DefaultClock);
        let unclaimed = queue.update(&email, now).await;
        ensure!(
            matches!(unclaimed, Err(EmailQueueError::NotClaimed(id)) if id == email.id()),
            "expected not claimed, got {unclaimed:?}"
        );

        let mut claimed = queue
            .claim(email.id(), window_at(now))
            .await?
            .ok_or_else(|| eyre::eyre!("pending email should be claimable"))?;
        let stamp = claimed
            .claimed_at()
            .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;
        claimed.mark_sent(&DefaultClock);
        queue.update(&claimed, stamp).await?;

        let stored = queue.list_for_application(candidate.id()).await?;
        let [sent] = stored.as_slice() else {
            bail!("expected one stored email, got {}", stored.len());
        };
        ensure!(sent.status() == EmailStatus::Sent);
        ensure!(sent.claimed_at().is_none());
        ensure!(queue.claim(email.id(), window_at(Utc::now())).await?.is_none());

        let second = queue.update(&claimed, stamp).await;
        ensure!(
            matches!(second, Err(EmailQueueError::NotClaimed(_))),
            "settled email was overwritten: {second:?}"
        );
        Ok(())
    })
}

#[rstest]
fn a_superseded_claim_cannot_write_its_outcome(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let queue = PostgresEmailQueue::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let now = Utc::now();
        let email = queued_for(&candidate, now - Duration::hours(1));
        queue.enqueue(&email).await?;

        let mut slow = queue
            .claim(email.id(), window_at(now - Duration::minutes(10)))
            .await?
            .ok_or_else(|| eyre::eyre!("pending email should be claimable"))?;
        let slow_stamp = slow
            .claimed_at()
            .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;
        let mut current = queue
            .claim(email.id(), window_at(now))
            .await?
            .ok_or_else(|| eyre::eyre!("abandoned claim should be taken over"))?;
        let current_stamp = current
            .claimed_at()
            .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;

        slow.record_failure("gateway timeout", 3);
        let late = queue.update(&slow, slow_stamp).await;
        ensure!(
            matches!(late, Err(EmailQueueError::NotClaimed(id)) if id == email.id()),
            "expected the superseded write to be refused, got {late:?}"
        );

        current.mark_sent(&DefaultClock);
        queue.update(&current, current_stamp).await?;
        let stored = queue.list_for_application(candidate.id()).await?;
        let [sent] = stored.as_slice() else {
            bail!("expected one stored email, got {}", stored.len());
        };
        ensure!(sent.status() == EmailStatus::Sent);
        ensure!(sent.retry_count() == 0);
        Ok(())
    })
}

#[rstest]
fn claiming_an_unknown_email_is_not_found(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let queue = PostgresEmailQueue::new(database.pool());
    let id = QueuedEmailId::new();

    let result = test_runtime()?.block_on(queue.claim(id, window_at(Utc::now())));

    ensure!(
        matches!(result, Err(EmailQueueError::NotFound(missing)) if missing == id),
        "expected not found, got {result:?}"
    );
    Ok(())
}
