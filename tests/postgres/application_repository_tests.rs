//! Revision checks and notification flag claims against `PostgreSQL`.

use super::helpers::{TestDatabase, application, stored_application, test_runtime};
use eyre::ensure;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use synchrohr::pipeline::{
    adapters::postgres::PostgresApplicationRepository,
    domain::{
        AuditAction, AuditEntry, NotificationFlag, PipelineStage, ScreeningDecision,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError},
};

#[rstest]
fn stale_revision_is_refused_with_a_conflict(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresApplicationRepository::new(database.pool());
    let clock = DefaultClock;

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
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

        ensure!(
            matches!(
                result,
                Err(ApplicationRepositoryError::Conflict { expected: 0, .. })
            ),
            "expected a revision conflict, got {result:?}"
        );
        let stored = repo
            .find_by_id(candidate.id())
            .await?
            .ok_or_else(|| eyre::eyre!("application should exist"))?;
        ensure!(stored.stage() == PipelineStage::Selected);
        ensure!(stored.revision() == 1);
        ensure!(repo.audit_trail(candidate.id()).await?.len() == 1);
        Ok(())
    })
}

#[rstest]
fn transition_of_an_unknown_application_is_not_found(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresApplicationRepository::new(database.pool());
    let clock = DefaultClock;
    let mut missing = application("Grace Hopper", "grace@example.com")?;
    let from = missing.apply_decision(ScreeningDecision::Selected, true, &clock)?;
    let entry = AuditEntry::transition(
        missing.id(),
        AuditAction::ManualSelected,
        from,
        missing.stage(),
        &clock,
    );

    let result = test_runtime()?.block_on(repo.record_transition(&missing, &entry));

    ensure!(
        matches!(result, Err(ApplicationRepositoryError::NotFound(id)) if id == missing.id()),
        "expected not found, got {result:?}"
    );
    Ok(())
}

#[rstest]
fn a_flag_is_claimed_by_exactly_one_writer(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresApplicationRepository::new(database.pool());

    test_runtime()?.block_on(async {
        let candidate = stored_application(database.pool()).await?;
        let flag = NotificationFlag::SelectionEmailSent;

        let (a, b, c, d) = tokio::join!(
            repo.claim_notification(candidate.id(), flag),
            repo.claim_notification(candidate.id(), flag),
            repo.claim_notification(candidate.id(), flag),
            repo.claim_notification(candidate.id(), flag),
        );

        let winners = [a?, b?, c?, d?].into_iter().filter(|won| *won).count();
        ensure!(winners == 1, "expected one winner, got {winners}");
        let stored = repo
            .find_by_id(candidate.id())
            .await?
            .ok_or_else(|| eyre::eyre!("application should exist"))?;
        ensure!(stored.flags().is_set(flag));
        ensure!(!stored.flags().is_set(NotificationFlag::RejectionEmailSent));
        Ok(())
    })
}

#[rstest]
fn claimed_flags_survive_a_later_transition(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresApplicationRepository::new(database.pool());
    let clock = DefaultClock;

    test_runtime()?.block_on(async {
        let mut candidate = stored_application(database.pool()).await?;
        ensure!(
            repo.claim_notification(candidate.id(), NotificationFlag::SelectionEmailSent)
                .await?
        );

        let from = candidate.apply_decision(ScreeningDecision::Selected, true, &clock)?;
        let entry = AuditEntry::transition(
            candidate.id(),
            AuditAction::ManualSelected,
            from,
            candidate.stage(),
            &clock,
        );
        repo.record_transition(&candidate, &entry).await?;

        let stored = repo
            .find_by_id(candidate.id())
            .await?
            .ok_or_else(|| eyre::eyre!("application should exist"))?;
        ensure!(stored.flags().is_set(NotificationFlag::SelectionEmailSent));
        Ok(())
    })
}

#[rstest]
fn claiming_a_flag_of_an_unknown_application_is_not_found(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = PostgresApplicationRepository::new(database.pool());
    let missing = application("Grace Hopper", "grace@example.com")?;

    let result = test_runtime()?.block_on(
        repo.claim_notification(missing.id(), NotificationFlag::RejectionEmailSent),
    );

    ensure!(
        matches!(result, Err(ApplicationRepositoryError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    Ok(())
}
