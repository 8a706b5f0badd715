//! Resume analyzer backed by an OpenAI-compatible chat completions endpoint.

use crate::pipeline::{
    domain::{Application, ResumeAnalysis},
    ports::{JobContext, ResumeAnalyzer, ResumeAnalyzerError, ResumeAnalyzerResult},
};
use async_trait::async_trait;
use minijinja::{Environment, context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TEMPERATURE: f64 = 0.7;

const SYSTEM_PROMPT: &str = "\
You are an expert HR recruitment analyst specializing in resume evaluation.
Analyze the following resume against the job requirements and provide a comprehensive evaluation.

Your response MUST be a valid JSON object with this exact structure:
{
  \"ai_score\": <number between 0-100>,
  \"recommendation\": \"<Highly Recommended|Recommended|Consider|Not Recommended>\",
  \"skills_match\": <number between 0-100>,
  \"experience_match\": <number between 0-100>,
  \"education_match\": <number between 0-100>,
  \"key_strengths\": [<array of 3-5 specific strengths>],
  \"areas_of_concern\": [<array of areas to explore in interview>],
  \"skill_gaps\": [<array of missing or weak skills>],
  \"detailed_analysis\": \"<2-3 sentence summary of candidate fit>\"
}

Be objective, thorough, and focus on matching the candidate's qualifications to the job requirements.";

const USER_PROMPT_TEMPLATE: &str = "\
{% if job_title %}Job Title: {{ job_title }}
{% endif %}{% if job_description %}Description: {{ job_description }}
{% endif %}{% if requirements %}Requirements: {{ requirements }}
{% endif %}
Candidate Name: {{ candidate_name }}
Email: {{ email }}
Phone: {{ phone }}
Position Applied: {{ position_applied }}
Parsed Resume Data: {{ parsed_resume }}

Provide detailed resume analysis as JSON.";

/// Connection settings for the analysis model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Full chat completions URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
}

/// OpenAI-compatible [`ResumeAnalyzer`].
#[derive(Debug, Clone)]
pub struct OpenAiResumeAnalyzer {
    client: Client,
    settings: AnalyzerSettings,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    response_format: ResponseFormat,
}

/// Builds the chat completion body for one analysis.
pub(crate) const fn chat_request<'a>(model: &'a str, user_prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: user_prompt,
            },
        ],
        temperature: TEMPERATURE,
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiResumeAnalyzer {
    /// Creates an analyzer for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ResumeAnalyzerError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(settings: AnalyzerSettings) -> ResumeAnalyzerResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ResumeAnalyzerError::transport)?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ResumeAnalyzer for OpenAiResumeAnalyzer {
    async fn analyze(
        &self,
        application: &Application,
        job: &JobContext,
    ) -> ResumeAnalyzerResult<ResumeAnalysis> {
        let user_prompt = render_user_prompt(application, job)?;
        let request = chat_request(&self.settings.model, &user_prompt);

        debug!(
            application_id = %application.id(),
            model = %self.settings.model,
            "requesting resume analysis"
        );
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ResumeAnalyzerError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResumeAnalyzerError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(ResumeAnalyzerError::transport)?;
        let content = body
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ResumeAnalyzerError::EmptyContent)?;
        Ok(parse_analysis(&content))
    }
}

/// Renders the user turn describing the job and the candidate.
pub(crate) fn render_user_prompt(
    application: &Application,
    job: &JobContext,
) -> ResumeAnalyzerResult<String> {
    let requirements = job
        .requirements
        .as_ref()
        .map(serde_json::Value::to_string)
        .unwrap_or_default();
    let parsed_resume = application
        .parsed_resume()
        .map_or_else(|| "{}".to_owned(), serde_json::Value::to_string);
    let environment = Environment::new();
    environment
        .render_str(
            USER_PROMPT_TEMPLATE,
            context! {
                job_title => job.title.as_deref().unwrap_or_default(),
                job_description => job.description.as_deref().unwrap_or_default(),
                requirements => requirements,
                candidate_name => application.candidate_name().as_str(),
                email => application.email().as_str(),
                phone => application.phone().map_or("N/A", |phone| phone.as_str()),
                position_applied => application.position_applied(),
                parsed_resume => parsed_resume,
            },
        )
        .map_err(|err| ResumeAnalyzerError::Prompt(err.to_string()))
}

/// Parses a model reply, falling back to the neutral analysis.
pub(crate) fn parse_analysis(content: &str) -> ResumeAnalysis {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    match serde_json::from_str::<ResumeAnalysis>(json) {
        Ok(analysis) if analysis.validate().is_ok() => analysis,
        Ok(analysis) => {
            warn!(
                ai_score = analysis.ai_score,
                "analysis scores out of range, using fallback analysis"
            );
            ResumeAnalysis::fallback()
        }
        Err(err) => {
            warn!(error = %err, "failed to parse analysis reply, using fallback analysis");
            ResumeAnalysis::fallback()
        }
    }
}
