//! Manual screening decisions and offers.

use super::{ApplicationServiceError, ApplicationServiceResult};
use crate::interview::services::{InterviewScheduler, ScheduledInterview};
use crate::notification::{
    domain::{EmailKind, EmailPayload},
    ports::EmailQueueResult,
    services::{NotificationDispatch, NotificationDispatcher},
};
use crate::pipeline::{
    domain::{
        Application, ApplicationId, AuditAction, AuditEntry, PipelineStage, ScreeningDecision,
    },
    ports::ApplicationRepository,
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a screening decision.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// Application after the decision and any automatic scheduling.
    pub application: Application,
    /// Outcome of the decision email.
    pub notification: NotificationDispatch,
    /// Interview scheduled automatically after a selection.
    pub interview: Option<ScheduledInterview>,
}

/// HR screening decisions.
pub struct ScreeningService<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    notifications: Arc<NotificationDispatcher<C>>,
    scheduler: Option<Arc<InterviewScheduler<C>>>,
    clock: Arc<C>,
}

impl<C> ScreeningService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a screening service without automatic interview scheduling.
    #[must_use]
    pub const fn new(
        applications: Arc<dyn ApplicationRepository>,
        notifications: Arc<NotificationDispatcher<C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            applications,
            notifications,
            scheduler: None,
            clock,
        }
    }

    /// Schedules an automated interview after every manual selection.
    #[must_use]
    pub fn with_auto_schedule(mut self, scheduler: Arc<InterviewScheduler<C>>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Records an HR decision and notifies the candidate once.
    ///
    /// The stage change stands even when the notification cannot be queued.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError`] when the application is missing,
    /// is demo data, cannot move to the decided stage, lost a concurrent
    /// update, or the notification could not be queued.
    pub async fn decide(
        &self,
        id: ApplicationId,
        decision: ScreeningDecision,
        performed_by: Option<String>,
    ) -> ApplicationServiceResult<DecisionOutcome> {
        let mut application = self.load(id).await?;
        let from = application.apply_decision(decision, true, &*self.clock)?;
        let action = match decision {
            ScreeningDecision::Selected => AuditAction::ManualSelected,
            ScreeningDecision::Rejected => AuditAction::ManualRejected,
        };
        let entry = AuditEntry::transition(id, action, from, application.stage(), &*self.clock)
            .with_performed_by(performed_by)
            .with_details(json!({
                "decision": decision.as_str(),
                "manual_override": true,
            }));
        self.applications
            .record_transition(&application, &entry)
            .await?;
        application.commit_revision();
        info!(application_id = %id, %from, to = %application.stage(), "manual screening decision");

        let notification =
            notify_decision(&self.notifications, &application, decision, &*self.clock).await?;

        let interview = match (&self.scheduler, decision) {
            (Some(scheduler), ScreeningDecision::Selected) => {
                auto_schedule(scheduler, id).await
            }
            _ => None,
        };
        Ok(DecisionOutcome {
            application: interview
                .as_ref()
                .map_or(application, |scheduled| scheduled.application.clone()),
            notification,
            interview,
        })
    }

    /// Moves an interviewed candidate to `offered`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError`] when the application is missing,
    /// is not `interviewed`, or lost a concurrent update.
    pub async fn extend_offer(
        &self,
        id: ApplicationId,
        performed_by: Option<String>,
    ) -> ApplicationServiceResult<Application> {
        let mut application = self.load(id).await?;
        application.ensure_processable()?;
        let from = application.transition_to(PipelineStage::Offered, &*self.clock)?;
        let entry = AuditEntry::transition(
            id,
            AuditAction::OfferExtended,
            from,
            application.stage(),
            &*self.clock,
        )
        .with_performed_by(performed_by);
        self.applications
            .record_transition(&application, &entry)
            .await?;
        application.commit_revision();
        info!(application_id = %id, "offer extended");
        Ok(application)
    }

    async fn load(&self, id: ApplicationId) -> ApplicationServiceResult<Application> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or(ApplicationServiceError::NotFound(id))
    }
}

async fn auto_schedule<C>(
    scheduler: &InterviewScheduler<C>,
    id: ApplicationId,
) -> Option<ScheduledInterview>
where
    C: Clock + Send + Sync,
{
    match scheduler.schedule(id, None).await {
        Ok(scheduled) => Some(scheduled),
        Err(err) => {
            warn!(application_id = %id, error = %err, "automatic interview scheduling failed");
            None
        }
    }
}

/// Queues the selection or rejection email for a decided application.
pub(super) async fn notify_decision<C>(
    notifications: &NotificationDispatcher<C>,
    application: &Application,
    decision: ScreeningDecision,
    clock: &C,
) -> EmailQueueResult<NotificationDispatch>
where
    C: Clock + Send + Sync,
{
    let kind = match decision {
        ScreeningDecision::Selected => EmailKind::Selection,
        ScreeningDecision::Rejected => EmailKind::Rejection,
    };
    let payload = EmailPayload::for_application(application, application.job_title());
    notifications
        .dispatch(application, kind, payload, clock.utc())
        .await
}
