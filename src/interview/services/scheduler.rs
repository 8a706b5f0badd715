//! Automated interview invitations for selected candidates.

use super::{InterviewServiceError, InterviewServiceResult};
use crate::interview::{
    domain::{Interview, InterviewId, InterviewToken, TokenSecret},
    ports::InterviewRepository,
};
use crate::notification::{
    domain::{EmailKind, EmailPayload},
    services::{NotificationDispatch, NotificationDispatcher},
};
use crate::pipeline::{
    domain::{
        Application, ApplicationId, AuditAction, AuditEntry, NotificationFlag, PipelineStage,
    },
    ports::ApplicationRepository,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Base URL of the candidate portal, without a trailing slash.
    pub portal_base_url: String,
    /// How long a token stays valid after the interview start time.
    pub token_ttl_hours: u32,
    /// Delay used when the caller does not name one.
    pub default_delay_hours: u32,
}

impl SchedulerSettings {
    /// Token lifetime used by the hosted scheduling function.
    pub const DEFAULT_TOKEN_TTL_HOURS: u32 = 48;
    /// Delay used by the manual selection flow.
    pub const DEFAULT_DELAY_HOURS: u32 = 1;

    /// Creates settings for `portal_base_url` with default timings.
    #[must_use]
    pub fn new(portal_base_url: impl Into<String>) -> Self {
        let raw = portal_base_url.into();
        Self {
            portal_base_url: raw.trim_end_matches('/').to_owned(),
            token_ttl_hours: Self::DEFAULT_TOKEN_TTL_HOURS,
            default_delay_hours: Self::DEFAULT_DELAY_HOURS,
        }
    }
}

/// Everything produced by a successful invitation.
#[derive(Debug, Clone)]
pub struct ScheduledInterview {
    /// Application after the transition to `interview_scheduled`.
    pub application: Application,
    /// The created interview.
    pub interview: Interview,
    /// Portal secret. Only returned here; storage keeps the digest.
    pub secret: TokenSecret,
    /// Token expiry.
    pub token_expires_at: DateTime<Utc>,
    /// Outcome of the invitation email.
    pub notification: NotificationDispatch,
}

/// Issues interview invitations.
pub struct InterviewScheduler<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
    notifications: Arc<NotificationDispatcher<C>>,
    settings: SchedulerSettings,
    clock: Arc<C>,
}

impl<C> InterviewScheduler<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a scheduler.
    #[must_use]
    pub const fn new(
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
        notifications: Arc<NotificationDispatcher<C>>,
        settings: SchedulerSettings,
        clock: Arc<C>,
    ) -> Self {
        Self {
            applications,
            interviews,
            notifications,
            settings,
            clock,
        }
    }

    /// Returns the scheduler settings.
    #[must_use]
    pub const fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Invites the candidate of a selected application to an AI interview
    /// starting `delay_hours` from now.
    ///
    /// The interview and token are stored before the application moves to
    /// `interview_scheduled`, and the invitation flag is raised last. A run
    /// that fails after the transition but before the flag leaves the
    /// application `interview_scheduled` without an invitation; calling
    /// `schedule` again resumes from there.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewServiceError`] when the delay is too long, the
    /// application is missing, demo data or not `selected`, the invitation
    /// was already issued, or a store rejects a write.
    pub async fn schedule(
        &self,
        application_id: ApplicationId,
        delay_hours: Option<u32>,
    ) -> InterviewServiceResult<ScheduledInterview> {
        let delay =
            Interview::check_delay(delay_hours.unwrap_or(self.settings.default_delay_hours))?;
        let mut application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or(InterviewServiceError::ApplicationNotFound(application_id))?;
        application.ensure_processable()?;
        if application.flags().is_set(NotificationFlag::InterviewInvitationSent) {
            return Err(InterviewServiceError::AlreadyInvited(application_id));
        }
        let resuming = application.stage() == PipelineStage::InterviewScheduled;
        if !resuming {
            application.clone().schedule_interview(&*self.clock)?;
        }

        let scheduled_for = self.clock.utc() + Duration::hours(i64::from(delay));
        let secret = TokenSecret::generate();
        let interview = Interview::schedule(
            InterviewId::new(),
            application_id,
            application.candidate_name().as_str(),
            scheduled_for,
            self.interview_link(&secret),
            &*self.clock,
        );
        let ttl = Duration::hours(i64::from(delay) + i64::from(self.settings.token_ttl_hours));
        let token = InterviewToken::issue(application_id, interview.id(), &secret, ttl, &*self.clock);
        self.interviews.store_invitation(&interview, &token).await?;

        if let Err(err) = self
            .commit_invitation(&mut application, resuming, delay)
            .await
        {
            self.discard(interview).await;
            return Err(err);
        }

        let payload = EmailPayload::for_application(&application, application.job_title())
            .with_interview(interview.interview_link(), scheduled_for, token.expires_at());
        let notification = self
            .notifications
            .dispatch(
                &application,
                EmailKind::InterviewScheduled,
                payload,
                scheduled_for,
            )
            .await?;

        info!(
            %application_id,
            interview_id = %interview.id(),
            delay_hours = delay,
            resumed = resuming,
            "automated interview scheduled"
        );
        Ok(ScheduledInterview {
            application,
            interview,
            secret,
            token_expires_at: token.expires_at(),
            notification,
        })
    }

    /// Moves the application to `interview_scheduled` unless `resuming`, then
    /// raises the invitation flag.
    async fn commit_invitation(
        &self,
        application: &mut Application,
        resuming: bool,
        delay: u32,
    ) -> InterviewServiceResult<()> {
        let application_id = application.id();
        if !resuming {
            let from = application.schedule_interview(&*self.clock)?;
            let entry = AuditEntry::transition(
                application_id,
                AuditAction::InterviewScheduled,
                from,
                application.stage(),
                &*self.clock,
            )
            .with_details(json!({
                "delay_hours": delay,
                "notes": format!("Automated interview scheduled with {delay}h delay"),
            }));
            self.applications
                .record_transition(application, &entry)
                .await?;
            application.commit_revision();
        }

        let claimed = self
            .applications
            .claim_notification(application_id, NotificationFlag::InterviewInvitationSent)
            .await?;
        if !claimed {
            warn!(%application_id, "interview invitation already issued");
            return Err(InterviewServiceError::AlreadyInvited(application_id));
        }
        Ok(())
    }

    /// Cancels an interview whose invitation could not be committed.
    async fn discard(&self, mut interview: Interview) {
        let interview_id = interview.id();
        if let Err(err) = interview.cancel(&*self.clock) {
            warn!(%interview_id, error = %err, "orphaned interview could not be cancelled");
            return;
        }
        if let Err(err) = self.interviews.update_interview(&interview).await {
            warn!(%interview_id, error = %err, "orphaned interview could not be cancelled");
        }
    }

    fn interview_link(&self, secret: &TokenSecret) -> String {
        format!(
            "{}/interview/login?token={}",
            self.settings.portal_base_url,
            secret.as_str()
        )
    }
}
