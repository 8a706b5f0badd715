//! Model-assisted resume screening.

use super::{ApplicationServiceError, ApplicationServiceResult, screening::notify_decision};
use crate::notification::services::{NotificationDispatch, NotificationDispatcher};
use crate::pipeline::{
    domain::{
        Application, ApplicationId, AtsScore, AuditAction, AuditEntry, ResumeAnalysis,
        ScreeningDecision, ScreeningPolicy, ScreeningStatus,
    },
    ports::{ApplicationRepository, JobContext, ResumeAnalyzer},
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of screening one application with the model.
#[derive(Debug, Clone)]
pub struct AiScreeningOutcome {
    /// Application after the decision.
    pub application: Application,
    /// Model analysis.
    pub analysis: ResumeAnalysis,
    /// Composite score the decision was based on.
    pub ats_score: AtsScore,
    /// Decision taken.
    pub decision: ScreeningDecision,
    /// Outcome of the decision email.
    pub notification: NotificationDispatch,
}

/// Per-application result of a bulk screening run.
#[derive(Debug)]
pub struct PendingScreeningResult {
    /// Screened application.
    pub application_id: ApplicationId,
    /// Outcome or the failure for this application.
    pub result: ApplicationServiceResult<AiScreeningOutcome>,
}

/// Screens applications with a [`ResumeAnalyzer`] and a threshold policy.
pub struct AiScreeningService<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    analyzer: Arc<dyn ResumeAnalyzer>,
    notifications: Arc<NotificationDispatcher<C>>,
    policy: ScreeningPolicy,
    clock: Arc<C>,
}

impl<C> AiScreeningService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an AI screening service.
    #[must_use]
    pub const fn new(
        applications: Arc<dyn ApplicationRepository>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        notifications: Arc<NotificationDispatcher<C>>,
        policy: ScreeningPolicy,
        clock: Arc<C>,
    ) -> Self {
        Self {
            applications,
            analyzer,
            notifications,
            policy,
            clock,
        }
    }

    /// Returns the threshold policy.
    #[must_use]
    pub const fn policy(&self) -> ScreeningPolicy {
        self.policy
    }

    /// Analyzes one `applied` application and applies the policy decision.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError`] when the application is missing,
    /// is demo data or already screened, the analyzer fails, the update
    /// loses a race, or the notification cannot be queued.
    pub async fn screen(
        &self,
        id: ApplicationId,
        job: &JobContext,
    ) -> ApplicationServiceResult<AiScreeningOutcome> {
        let application = self
            .applications
            .find_by_id(id)
            .await?
            .ok_or(ApplicationServiceError::NotFound(id))?;
        self.screen_loaded(application, job).await
    }

    /// Screens every application still awaiting screening.
    ///
    /// Demo records are skipped. A failure for one application is reported
    /// in its entry and does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError::Repository`] when the pending
    /// applications cannot be listed.
    pub async fn screen_pending(
        &self,
        job: &JobContext,
    ) -> ApplicationServiceResult<Vec<PendingScreeningResult>> {
        let pending = self
            .applications
            .list(Some(ScreeningStatus::Pending))
            .await?;
        let mut results = Vec::with_capacity(pending.len());
        for application in pending.into_iter().filter(|candidate| !candidate.is_demo()) {
            let application_id = application.id();
            let result = self.screen_loaded(application, job).await;
            if let Err(err) = &result {
                warn!(%application_id, error = %err, "bulk AI screening skipped application");
            }
            results.push(PendingScreeningResult {
                application_id,
                result,
            });
        }
        Ok(results)
    }

    async fn screen_loaded(
        &self,
        mut application: Application,
        job: &JobContext,
    ) -> ApplicationServiceResult<AiScreeningOutcome> {
        application.ensure_awaiting_screening()?;
        let analysis = self.analyzer.analyze(&application, job).await?;
        analysis.validate()?;
        let ats_score = AtsScore::from_analysis(&analysis);
        let decision = self.policy.decide(ats_score);

        application.record_analysis(&analysis, ats_score, &*self.clock)?;
        let from = application.apply_decision(decision, false, &*self.clock)?;
        let action = match decision {
            ScreeningDecision::Selected => AuditAction::AiScreeningSelected,
            ScreeningDecision::Rejected => AuditAction::AiScreeningRejected,
        };
        let entry = AuditEntry::transition(
            application.id(),
            action,
            from,
            application.stage(),
            &*self.clock,
        )
        .with_details(json!({
            "ai_score": analysis.ai_score,
            "ats_score": ats_score.value(),
            "recommendation": analysis.recommendation,
            "threshold": self.policy.selection_threshold(),
            "auto_decision": true,
        }));
        self.applications
            .record_transition(&application, &entry)
            .await?;
        application.commit_revision();
        info!(
            application_id = %application.id(),
            ats_score = ats_score.value(),
            decision = decision.as_str(),
            "AI screening decision"
        );

        let notification =
            notify_decision(&self.notifications, &application, decision, &*self.clock).await?;
        Ok(AiScreeningOutcome {
            application,
            analysis,
            ats_score,
            decision,
            notification,
        })
    }
}
