//! Token validation and interview completion.

use super::{InterviewServiceError, InterviewServiceResult};
use crate::interview::{
    domain::{Interview, InterviewDomainError, InterviewId, InterviewToken, TokenSecret},
    ports::InterviewRepository,
};
use crate::notification::{
    domain::{EmailKind, EmailPayload},
    services::{NotificationDispatch, NotificationDispatcher},
};
use crate::pipeline::{
    domain::{Application, ApplicationId, AuditAction, AuditEntry, PipelineStage},
    ports::{ApplicationRepository, ApplicationRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Identifiers unlocked by a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenValidation {
    /// Application the token belongs to.
    pub application_id: ApplicationId,
    /// Interview the token opens.
    pub interview_id: InterviewId,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Result of completing an interview.
#[derive(Debug, Clone)]
pub struct CompletedInterview {
    /// Application after the transition to `interviewed`.
    pub application: Application,
    /// The completed interview.
    pub interview: Interview,
    /// Outcome of the completion email, when it could be queued.
    pub notification: Option<NotificationDispatch>,
    /// Whether the completion email still awaits delivery.
    pub notification_deferred: bool,
}

/// Completes interviews presented with a portal token.
pub struct InterviewCompletionService<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
    notifications: Arc<NotificationDispatcher<C>>,
    clock: Arc<C>,
}

impl<C> InterviewCompletionService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a completion service.
    #[must_use]
    pub const fn new(
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
        notifications: Arc<NotificationDispatcher<C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            applications,
            interviews,
            notifications,
            clock,
        }
    }

    /// Checks that `secret` names an unused, unexpired token.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewServiceError::InvalidToken`] for an unknown secret
    /// and [`InterviewServiceError::Interview`] for a used or expired token.
    pub async fn validate_token(
        &self,
        secret: &TokenSecret,
    ) -> InterviewServiceResult<TokenValidation> {
        let token = self.usable_token(secret).await?;
        Ok(TokenValidation {
            application_id: token.application_id(),
            interview_id: token.interview_id(),
            expires_at: token.expires_at(),
        })
    }

    /// Consumes the token, completes the interview, moves the application
    /// to `interviewed` and notifies the candidate.
    ///
    /// The application stage and interview status are checked before the
    /// token is consumed, so a refused completion leaves the token usable.
    /// Notification problems after the completion is recorded do not fail
    /// the call; they are reported through
    /// [`CompletedInterview::notification_deferred`].
    ///
    /// # Errors
    ///
    /// Returns [`InterviewServiceError::ApplicationClosed`] when the
    /// application can no longer move to `interviewed`, and other
    /// [`InterviewServiceError`] variants when the token is invalid, already
    /// consumed or expired, or a store rejects a write.
    pub async fn complete(&self, secret: &TokenSecret) -> InterviewServiceResult<CompletedInterview> {
        let token = self.usable_token(secret).await?;
        let mut application = self.interviewable(token.application_id()).await?;
        let mut interview = self
            .interviews
            .find_interview(token.interview_id())
            .await?
            .ok_or(InterviewServiceError::InterviewNotFound)?;
        interview.complete(&*self.clock)?;

        if !self
            .interviews
            .consume_token(token.id(), self.clock.utc())
            .await?
        {
            return Err(InterviewDomainError::TokenAlreadyUsed.into());
        }
        self.interviews.update_interview(&interview).await?;
        self.record_completion(&mut application, interview.id()).await?;
        info!(
            application_id = %application.id(),
            interview_id = %interview.id(),
            "interview completed"
        );

        let (notification, notification_deferred) = self.notify(&application).await;
        Ok(CompletedInterview {
            application,
            interview,
            notification,
            notification_deferred,
        })
    }

    /// Loads an application that may still move to `interviewed`.
    async fn interviewable(&self, application_id: ApplicationId) -> InterviewServiceResult<Application> {
        let application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or(InterviewServiceError::ApplicationNotFound(application_id))?;
        let stage = application.stage();
        if !stage.can_transition_to(PipelineStage::Interviewed) {
            return Err(InterviewServiceError::ApplicationClosed {
                application_id,
                stage,
            });
        }
        Ok(application)
    }

    /// Records the move to `interviewed`, reloading once when another
    /// writer bumped the revision after the token was consumed.
    async fn record_completion(
        &self,
        application: &mut Application,
        interview_id: InterviewId,
    ) -> InterviewServiceResult<()> {
        match self.try_record_completion(application, interview_id).await {
            Err(InterviewServiceError::ApplicationRepository(
                ApplicationRepositoryError::Conflict { .. },
            )) => {
                warn!(
                    application_id = %application.id(),
                    "application changed during completion, retrying"
                );
                *application = self.interviewable(application.id()).await?;
                self.try_record_completion(application, interview_id).await
            }
            other => other,
        }
    }

    async fn try_record_completion(
        &self,
        application: &mut Application,
        interview_id: InterviewId,
    ) -> InterviewServiceResult<()> {
        let mut next = application.clone();
        let from = next.transition_to(PipelineStage::Interviewed, &*self.clock)?;
        let entry = AuditEntry::transition(
            next.id(),
            AuditAction::InterviewCompleted,
            from,
            next.stage(),
            &*self.clock,
        )
        .with_details(json!({ "interview_id": interview_id }));
        self.applications.record_transition(&next, &entry).await?;
        next.commit_revision();
        *application = next;
        Ok(())
    }

    async fn usable_token(&self, secret: &TokenSecret) -> InterviewServiceResult<InterviewToken> {
        let token = self
            .interviews
            .find_token_by_digest(&secret.digest())
            .await?
            .ok_or(InterviewServiceError::InvalidToken)?;
        token.ensure_usable(self.clock.utc())?;
        Ok(token)
    }

    async fn notify(&self, application: &Application) -> (Option<NotificationDispatch>, bool) {
        let payload = EmailPayload::for_application(application, application.job_title());
        let dispatched = self
            .notifications
            .dispatch(
                application,
                EmailKind::InterviewCompleted,
                payload,
                self.clock.utc(),
            )
            .await;
        let notification = match dispatched {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    application_id = %application.id(),
                    error = %err,
                    "completion email could not be queued"
                );
                return (None, true);
            }
        };

        let mut deferred = matches!(notification, NotificationDispatch::Deferred { .. });
        if let Err(err) = self.notifications.processor().process_due().await {
            warn!(error = %err, "email queue processing after completion failed");
            deferred = true;
        }
        (Some(notification), deferred)
    }
}
