//! In-memory integration tests for the application repository contract.

use std::sync::Arc;

use super::helpers::{application, clock};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use synchrohr::pipeline::{
    adapters::memory::InMemoryApplicationRepository,
    domain::{
        ApplicationId, AuditAction, AuditEntry, NotificationFlag, PipelineStage,
        ScreeningDecision, ScreeningStatus,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_duplicate_identifiers() -> eyre::Result<()> {
    let repo = InMemoryApplicationRepository::new();
    let candidate = application("Ada Lovelace", "ada@example.com")?;
    repo.store(&candidate).await?;

    let result = repo.store(&candidate).await;

    let Err(ApplicationRepositoryError::DuplicateApplication(id)) = result else {
        bail!("expected duplicate error, got {result:?}");
    };
    ensure!(id == candidate.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_writers_lose_with_a_conflict(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryApplicationRepository::new();
    let candidate = application("Ada Lovelace", "ada@example.com")?;
    repo.store(&candidate).await?;
    let mut first = candidate.clone();
    let mut second = candidate.clone();

    let from = first.apply_decision(ScreeningDecision::Selected, true, &clock)?;
    let entry = AuditEntry::transition(
        first.id(),
        AuditAction::ManualSelected,
        from,
        first.stage(),
        &clock,
    );
    repo.record_transition(&first, &entry).await?;

    let from_second = second.apply_decision(ScreeningDecision::Rejected, true, &clock)?;
    let losing = AuditEntry::transition(
        second.id(),
        AuditAction::ManualRejected,
        from_second,
        second.stage(),
        &clock,
    );
    let result = repo.record_transition(&second, &losing).await;

    ensure!(matches!(
        result,
        Err(ApplicationRepositoryError::Conflict { expected: 0, .. })
    ));
    let stored = repo
        .find_by_id(candidate.id())
        .await?
        .ok_or_else(|| eyre::eyre!("application should exist"))?;
    ensure!(stored.stage() == PipelineStage::Selected);
    ensure!(stored.revision() == 1);
    ensure!(repo.audit_trail(candidate.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_do_not_overwrite_claimed_flags(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryApplicationRepository::new();
    let candidate = application("Ada Lovelace", "ada@example.com")?;
    repo.store(&candidate).await?;
    let mut loaded = repo
        .find_by_id(candidate.id())
        .await?
        .ok_or_else(|| eyre::eyre!("application should exist"))?;
    ensure!(
        repo.claim_notification(candidate.id(), NotificationFlag::SelectionEmailSent)
            .await?
    );

    let from = loaded.apply_decision(ScreeningDecision::Selected, true, &clock)?;
    let entry = AuditEntry::transition(
        loaded.id(),
        AuditAction::ManualSelected,
        from,
        loaded.stage(),
        &clock,
    );
    repo.record_transition(&loaded, &entry).await?;

    let stored = repo
        .find_by_id(candidate.id())
        .await?
        .ok_or_else(|| eyre::eyre!("application should exist"))?;
    ensure!(stored.flags().is_set(NotificationFlag::SelectionEmailSent));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_flag_is_claimed_once() -> eyre::Result<()> {
    let repo = Arc::new(InMemoryApplicationRepository::new());
    let candidate = application("Ada Lovelace", "ada@example.com")?;
    repo.store(&candidate).await?;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let shared = Arc::clone(&repo);
        let id = candidate.id();
        handles.push(tokio::spawn(async move {
            shared
                .claim_notification(id, NotificationFlag::RejectionEmailSent)
                .await
        }));
    }
    let mut winners = 0;
    for handle in handles {
        if handle.await?? {
            winners += 1;
        }
    }

    ensure!(winners == 1, "expected one winner, got {winners}");
    ensure!(
        repo.claim_notification(candidate.id(), NotificationFlag::SelectionEmailSent)
            .await?,
        "other flags stay claimable"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claims_on_unknown_applications_fail() {
    let repo = InMemoryApplicationRepository::new();

    let result = repo
        .claim_notification(ApplicationId::new(), NotificationFlag::SelectionEmailSent)
        .await;

    assert!(matches!(result, Err(ApplicationRepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_is_newest_first_and_filters_by_status(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryApplicationRepository::new();
    let older = application("Ada Lovelace", "ada@example.com")?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = application("Alan Turing", "alan@example.com")?;
    repo.store(&older).await?;
    repo.store(&newer).await?;
    let mut rejected = newer.clone();
    let from = rejected.apply_decision(ScreeningDecision::Rejected, true, &clock)?;
    let entry = AuditEntry::transition(
        rejected.id(),
        AuditAction::ManualRejected,
        from,
        rejected.stage(),
        &clock,
    );
    repo.record_transition(&rejected, &entry).await?;

    let all: Vec<_> = repo.list(None).await?.iter().map(|app| app.id()).collect();
    let pending: Vec<_> = repo
        .list(Some(ScreeningStatus::Pending))
        .await?
        .iter()
        .map(|app| app.id())
        .collect();
    let turned_down: Vec<_> = repo
        .list(Some(ScreeningStatus::Rejected))
        .await?
        .iter()
        .map(|app| app.id())
        .collect();

    ensure!(all == vec![newer.id(), older.id()]);
    ensure!(pending == vec![older.id()]);
    ensure!(turned_down == vec![newer.id()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_application_cannot_record_transitions(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryApplicationRepository::new();
    let mut unsaved = application("Ada Lovelace", "ada@example.com")?;
    let from = unsaved.apply_decision(ScreeningDecision::Selected, true, &clock)?;
    let entry = AuditEntry::transition(
        unsaved.id(),
        AuditAction::ManualSelected,
        from,
        unsaved.stage(),
        &clock,
    );

    let result = repo.record_transition(&unsaved, &entry).await;

    ensure!(matches!(result, Err(ApplicationRepositoryError::NotFound(_))));
    ensure!(repo.audit_trail(unsaved.id()).await?.is_empty());
    Ok(())
}
