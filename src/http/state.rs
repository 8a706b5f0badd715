//! Shared handler state and service wiring.

use mockable::DefaultClock;
use std::sync::Arc;

use crate::interview::{
    adapters::memory::InMemoryInterviewRepository,
    ports::InterviewRepository,
    services::{InterviewCompletionService, InterviewScheduler, SchedulerSettings},
};
use crate::notification::{
    adapters::memory::InMemoryEmailQueue,
    ports::{EmailQueueRepository, NotificationGateway},
    services::{EmailQueueProcessor, NotificationDispatcher, NotificationOutbox, QueueSettings},
};
use crate::pipeline::{
    adapters::memory::InMemoryApplicationRepository,
    domain::ScreeningPolicy,
    ports::{ApplicationRepository, ResumeAnalyzer},
    services::{AiScreeningService, ApplicationService, ScreeningService},
};

/// Port implementations the services run on.
#[derive(Clone)]
pub struct Backends {
    /// Application store.
    pub applications: Arc<dyn ApplicationRepository>,
    /// Email outbox store.
    pub email_queue: Arc<dyn EmailQueueRepository>,
    /// Interview and token store.
    pub interviews: Arc<dyn InterviewRepository>,
    /// Mail function gateway.
    pub gateway: Arc<dyn NotificationGateway>,
    /// Resume analyzer, when configured.
    pub analyzer: Option<Arc<dyn ResumeAnalyzer>>,
}

impl Backends {
    /// In-memory stores around `gateway`.
    #[must_use]
    pub fn in_memory(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self {
            applications: Arc::new(InMemoryApplicationRepository::new()),
            email_queue: Arc::new(InMemoryEmailQueue::new()),
            interviews: Arc::new(InMemoryInterviewRepository::new()),
            gateway,
            analyzer: None,
        }
    }

    /// Sets the resume analyzer.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }
}

/// Tunables applied while wiring the services.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Queue retry and batching limits.
    pub queue: QueueSettings,
    /// Interview link and token settings.
    pub scheduler: SchedulerSettings,
    /// AI selection threshold.
    pub screening_policy: ScreeningPolicy,
    /// Whether manual selections schedule the interview immediately.
    pub auto_schedule_interview: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            queue: QueueSettings::default(),
            scheduler: SchedulerSettings::new("http://localhost:8080"),
            screening_policy: ScreeningPolicy::default(),
            auto_schedule_interview: true,
        }
    }
}

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Intake and lookup.
    pub applications: Arc<ApplicationService<DefaultClock>>,
    /// Manual decisions and offers.
    pub screening: Arc<ScreeningService<DefaultClock>>,
    /// Model screening; `None` when no analyzer is configured.
    pub ai_screening: Option<Arc<AiScreeningService<DefaultClock>>>,
    /// Interview invitations.
    pub scheduler: Arc<InterviewScheduler<DefaultClock>>,
    /// Token validation and completion.
    pub completion: Arc<InterviewCompletionService<DefaultClock>>,
    /// Email queue processing.
    pub queue: Arc<EmailQueueProcessor<DefaultClock>>,
    /// Read access to queued emails.
    pub emails: Arc<dyn EmailQueueRepository>,
}

impl AppState {
    /// Wires every service over `backends`.
    #[must_use]
    pub fn assemble(backends: Backends, options: ServiceOptions) -> Self {
        let clock = Arc::new(DefaultClock);
        let processor = Arc::new(EmailQueueProcessor::new(
            Arc::clone(&backends.email_queue),
            Arc::clone(&backends.gateway),
            options.queue,
            Arc::clone(&clock),
        ));
        let outbox = NotificationOutbox::new(
            Arc::clone(&backends.applications),
            Arc::clone(&backends.email_queue),
            Arc::clone(&clock),
        );
        let notifications = Arc::new(NotificationDispatcher::new(
            outbox,
            Arc::clone(&processor),
            Arc::clone(&clock),
        ));
        let scheduler = Arc::new(InterviewScheduler::new(
            Arc::clone(&backends.applications),
            Arc::clone(&backends.interviews),
            Arc::clone(&notifications),
            options.scheduler,
            Arc::clone(&clock),
        ));

        let manual = ScreeningService::new(
            Arc::clone(&backends.applications),
            Arc::clone(&notifications),
            Arc::clone(&clock),
        );
        let screening = if options.auto_schedule_interview {
            manual.with_auto_schedule(Arc::clone(&scheduler))
        } else {
            manual
        };

        let ai_screening = backends.analyzer.map(|analyzer| {
            Arc::new(AiScreeningService::new(
                Arc::clone(&backends.applications),
                analyzer,
                Arc::clone(&notifications),
                options.screening_policy,
                Arc::clone(&clock),
            ))
        });

        Self {
            applications: Arc::new(ApplicationService::new(
                Arc::clone(&backends.applications),
                Arc::clone(&clock),
            )),
            screening: Arc::new(screening),
            ai_screening,
            scheduler,
            completion: Arc::new(InterviewCompletionService::new(
                backends.applications,
                backends.interviews,
                notifications,
                clock,
            )),
            queue: processor,
            emails: backends.email_queue,
        }
    }
}
