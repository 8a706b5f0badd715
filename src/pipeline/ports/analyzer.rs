//! Port for model-backed resume analysis.

use crate::pipeline::domain::{Application, ResumeAnalysis};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for resume analyzer operations.
pub type ResumeAnalyzerResult<T> = Result<T, ResumeAnalyzerError>;

/// Job role details the resume is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Job description.
    #[serde(default)]
    pub description: Option<String>,
    /// Structured requirements.
    #[serde(default)]
    pub requirements: Option<Value>,
}

impl JobContext {
    /// Returns the job title, falling back to the applied position.
    #[must_use]
    pub fn title_for<'a>(&'a self, application: &'a Application) -> &'a str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| application.job_title())
    }
}

/// Resume evaluation contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    /// Evaluates `application` against `job`.
    ///
    /// Implementations return [`ResumeAnalysis::fallback`] when the model
    /// replies with content that cannot be parsed.
    ///
    /// # Errors
    ///
    /// Returns [`ResumeAnalyzerError`] when the model cannot be reached or
    /// rejects the request.
    async fn analyze(
        &self,
        application: &Application,
        job: &JobContext,
    ) -> ResumeAnalyzerResult<ResumeAnalysis>;
}

/// Errors returned by resume analyzer implementations.
#[derive(Debug, Clone, Error)]
pub enum ResumeAnalyzerError {
    /// The prompt template failed to render.
    #[error("failed to render analysis prompt: {0}")]
    Prompt(String),

    /// The request could not be sent or the body could not be read.
    #[error("analysis transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The model endpoint returned a non-success status.
    #[error("analysis endpoint returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The model reply had no message content.
    #[error("analysis endpoint returned no content")]
    EmptyContent,
}

impl ResumeAnalyzerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
