//! Tests for flag-guarded enqueueing.

use std::sync::Arc;

use crate::notification::{
    adapters::memory::InMemoryEmailQueue,
    domain::{EmailKind, EmailPayload, EmailStatus},
    ports::EmailQueueRepository,
    services::{EnqueueOutcome, NotificationOutbox},
};
use crate::pipeline::{
    adapters::memory::InMemoryApplicationRepository,
    domain::{
        ApplicantProfile, Application, ApplicationSource, CandidateEmail, CandidateName,
        NotificationFlag,
    },
    ports::ApplicationRepository,
};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

struct OutboxFixture {
    applications: InMemoryApplicationRepository,
    queue: InMemoryEmailQueue,
    outbox: Arc<NotificationOutbox<DefaultClock>>,
}

#[fixture]
fn fixture() -> OutboxFixture {
    let applications = InMemoryApplicationRepository::new();
    let queue = InMemoryEmailQueue::new();
    let outbox = NotificationOutbox::new(
        Arc::new(applications.clone()),
        Arc::new(queue.clone()),
        Arc::new(DefaultClock),
    );
    OutboxFixture {
        applications,
        queue,
        outbox: Arc::new(outbox),
    }
}

async fn stored_application(repository: &InMemoryApplicationRepository) -> Application {
    let profile = ApplicantProfile {
        candidate_name: CandidateName::new("Ada Lovelace").expect("valid name"),
        email: CandidateEmail::new("ada@example.com").expect("valid email"),
        phone: None,
        position_applied: "Analyst".to_owned(),
        job_role_id: None,
        file_url: None,
        parsed_resume: None,
        source: ApplicationSource::Portal,
    };
    let application = Application::submit(profile, &DefaultClock);
    repository
        .store(&application)
        .await
        .expect("store should succeed");
    application
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_enqueue_claims_the_flag_and_queues(fixture: OutboxFixture) {
    let application = stored_application(&fixture.applications).await;
    let due = Utc::now() + Duration::hours(2);

    let outcome = fixture
        .outbox
        .enqueue(
            &application,
            EmailKind::Selection,
            EmailPayload::for_application(&application, "Analyst"),
            due,
        )
        .await
        .expect("enqueue should succeed");

    let EnqueueOutcome::Queued(email) = outcome else {
        panic!("first enqueue should queue the email");
    };
    assert_eq!(email.status(), EmailStatus::Pending);
    assert_eq!(email.scheduled_for(), due);
    assert_eq!(email.retry_count(), 0);
    let queued = fixture
        .queue
        .list_for_application(application.id())
        .await
        .expect("listing should succeed");
    assert_eq!(queued, vec![email]);
    let stored = fixture
        .applications
        .find_by_id(application.id())
        .await
        .expect("lookup should succeed")
        .expect("application exists");
    assert!(stored.flags().is_set(NotificationFlag::SelectionEmailSent));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_enqueue_is_skipped(fixture: OutboxFixture) {
    let application = stored_application(&fixture.applications).await;
    let payload = EmailPayload::for_application(&application, "Analyst");
    fixture
        .outbox
        .enqueue(&application, EmailKind::Rejection, payload.clone(), Utc::now())
        .await
        .expect("first enqueue should succeed");

    let outcome = fixture
        .outbox
        .enqueue(&application, EmailKind::Rejection, payload, Utc::now())
        .await
        .expect("second enqueue should succeed");

    assert_eq!(outcome, EnqueueOutcome::AlreadyDispatched);
    let queued = fixture
        .queue
        .list_for_application(application.id())
        .await
        .expect("listing should succeed");
    assert_eq!(queued.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn kinds_are_guarded_independently(fixture: OutboxFixture) {
    let application = stored_application(&fixture.applications).await;
    let payload = EmailPayload::for_application(&application, "Analyst");

    for kind in [EmailKind::Selection, EmailKind::InterviewScheduled] {
        let outcome = fixture
            .outbox
            .enqueue(&application, kind, payload.clone(), Utc::now())
            .await
            .expect("enqueue should succeed");
        assert!(matches!(outcome, EnqueueOutcome::Queued(_)), "{kind} should queue");
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_enqueues_queue_exactly_one_email(fixture: OutboxFixture) {
    let application = stored_application(&fixture.applications).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let outbox = Arc::clone(&fixture.outbox);
        let candidate = application.clone();
        handles.push(tokio::spawn(async move {
            let payload = EmailPayload::for_application(&candidate, "Analyst");
            outbox
                .enqueue(&candidate, EmailKind::Selection, payload, Utc::now())
                .await
        }));
    }
    let mut queued = 0;
    for handle in handles {
        let outcome = handle
            .await
            .expect("task should join")
            .expect("enqueue should succeed");
        if matches!(outcome, EnqueueOutcome::Queued(_)) {
            queued += 1;
        }
    }

    assert_eq!(queued, 1);
    let stored = fixture
        .queue
        .list_for_application(application.id())
        .await
        .expect("listing should succeed");
    assert_eq!(stored.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_application_cannot_be_notified(fixture: OutboxFixture) {
    let profile = ApplicantProfile {
        candidate_name: CandidateName::new("Ghost").expect("valid name"),
        email: CandidateEmail::new("ghost@example.com").expect("valid email"),
        phone: None,
        position_applied: "Analyst".to_owned(),
        job_role_id: None,
        file_url: None,
        parsed_resume: None,
        source: ApplicationSource::Portal,
    };
    let unsaved = Application::submit(profile, &DefaultClock);

    let result = fixture
        .outbox
        .enqueue(
            &unsaved,
            EmailKind::Selection,
            EmailPayload::for_application(&unsaved, "Analyst"),
            Utc::now(),
        )
        .await;

    assert!(result.is_err());
}
