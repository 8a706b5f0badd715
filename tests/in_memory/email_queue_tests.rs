//! In-memory integration tests for the email queue contract.

use super::helpers::{clock, email};
use chrono::{Duration, Utc};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use synchrohr::notification::{
    adapters::memory::InMemoryEmailQueue,
    domain::{DeliveryWindow, EmailKind, EmailStatus, QueuedEmailId},
    ports::{EmailQueueError, EmailQueueRepository},
};
use synchrohr::pipeline::domain::ApplicationId;

fn window(max_retries: u32) -> DeliveryWindow {
    let now = Utc::now();
    DeliveryWindow {
        now,
        max_retries,
        stale_before: now - Duration::minutes(5),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_due_returns_pending_emails_earliest_first(clock: DefaultClock) -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let now = Utc::now() - Duration::seconds(1);
    let owner = ApplicationId::new();
    let latest = email(owner, EmailKind::Selection, now - Duration::minutes(1));
    let earliest = email(owner, EmailKind::Rejection, now - Duration::hours(1));
    let future = email(owner, EmailKind::InterviewScheduled, now + Duration::hours(1));
    let mut sent = email(owner, EmailKind::InterviewCompleted, now - Duration::hours(2));
    sent.mark_sent(&clock);
    let mut exhausted = email(ApplicationId::new(), EmailKind::Selection, now - Duration::hours(3));
    for _ in 0..2 {
        exhausted.record_failure("timeout", 5);
    }
    for queued in [&latest, &earliest, &future, &sent, &exhausted] {
        queue.enqueue(queued).await?;
    }

    let due = queue.find_due(window(2), 10).await?;

    let ids: Vec<QueuedEmailId> = due.iter().map(|queued| queued.id()).collect();
    ensure!(ids == vec![earliest.id(), latest.id()], "unexpected due set {ids:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_due_respects_the_limit() -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let now = Utc::now();
    for minutes in 1..=4 {
        queue
            .enqueue(&email(
                ApplicationId::new(),
                EmailKind::Selection,
                now - Duration::minutes(minutes),
            ))
            .await?;
    }

    let due = queue.find_due(window(3), 3).await?;

    ensure!(due.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_persists_delivery_state(clock: DefaultClock) -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let queued = email(ApplicationId::new(), EmailKind::Selection, Utc::now() - Duration::seconds(1));
    queue.enqueue(&queued).await?;

    let mut claimed = queue
        .claim(queued.id(), window(3))
        .await?
        .ok_or_else(|| eyre::eyre!("pending email should be claimable"))?;
    ensure!(claimed.status() == EmailStatus::Sending);
    let stamp = claimed
        .claimed_at()
        .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;
    claimed.mark_sent(&clock);
    queue.update(&claimed, stamp).await?;

    let stored = queue.list_for_application(queued.application_id()).await?;
    ensure!(stored.len() == 1);
    ensure!(stored
        .iter()
        .all(|entry| entry.status() == EmailStatus::Sent && entry.sent_at().is_some()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_an_unknown_email_fails() {
    let queue = InMemoryEmailQueue::new();
    let stray = email(ApplicationId::new(), EmailKind::Rejection, Utc::now());

    let result = queue.update(&stray, Utc::now()).await;

    assert!(matches!(result, Err(EmailQueueError::NotFound(id)) if id == stray.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_email_is_claimed_once() -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let queued = email(ApplicationId::new(), EmailKind::Rejection, Utc::now() - Duration::seconds(1));
    queue.enqueue(&queued).await?;

    let first = queue.claim(queued.id(), window(3)).await?;
    let second = queue.claim(queued.id(), window(3)).await?;

    ensure!(first.is_some(), "first claim should win");
    ensure!(second.is_none(), "second claim should lose");
    ensure!(queue.find_due(window(3), 10).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_unclaimed_outcome_is_refused(clock: DefaultClock) {
    let queue = InMemoryEmailQueue::new();
    let mut queued = email(ApplicationId::new(), EmailKind::Selection, Utc::now());
    queue.enqueue(&queued).await.expect("enqueue should succeed");

    queued.mark_sent(&clock);
    let result = queue.update(&queued, Utc::now()).await;

    assert!(matches!(result, Err(EmailQueueError::NotClaimed(id)) if id == queued.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_superseded_claim_cannot_write_its_outcome(clock: DefaultClock) -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let now = Utc::now();
    let queued = email(ApplicationId::new(), EmailKind::Selection, now - Duration::hours(1));
    queue.enqueue(&queued).await?;

    let slow_window = DeliveryWindow {
        now: now - Duration::minutes(10),
        ..window(3)
    };
    let mut slow = queue
        .claim(queued.id(), slow_window)
        .await?
        .ok_or_else(|| eyre::eyre!("pending email should be claimable"))?;
    let slow_stamp = slow
        .claimed_at()
        .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;
    let mut current = queue
        .claim(queued.id(), window(3))
        .await?
        .ok_or_else(|| eyre::eyre!("abandoned claim should be taken over"))?;

    slow.record_failure("gateway timeout", 3);
    let late = queue.update(&slow, slow_stamp).await;

    ensure!(
        matches!(late, Err(EmailQueueError::NotClaimed(id)) if id == queued.id()),
        "expected the superseded write to be refused, got {late:?}"
    );
    let current_stamp = current
        .claimed_at()
        .ok_or_else(|| eyre::eyre!("claim should be stamped"))?;
    current.mark_sent(&clock);
    queue.update(&current, current_stamp).await?;
    let stored = queue.list_for_application(queued.application_id()).await?;
    ensure!(stored
        .iter()
        .all(|entry| entry.status() == EmailStatus::Sent && entry.retry_count() == 0));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_is_scoped_to_the_application() -> eyre::Result<()> {
    let queue = InMemoryEmailQueue::new();
    let mine = ApplicationId::new();
    queue
        .enqueue(&email(mine, EmailKind::Selection, Utc::now()))
        .await?;
    queue
        .enqueue(&email(ApplicationId::new(), EmailKind::Selection, Utc::now()))
        .await?;

    let listed = queue.list_for_application(mine).await?;

    ensure!(listed.len() == 1);
    ensure!(listed.iter().all(|entry| entry.application_id() == mine));
    Ok(())
}
