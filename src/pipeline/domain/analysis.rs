//! AI resume analysis results and the ATS scoring policy.

use super::{PipelineDomainError, ScreeningDecision};
use serde::{Deserialize, Serialize};

/// Structured resume evaluation returned by the analysis model.
///
/// Scores are kept as the model reported them; models regularly answer with
/// fractional values such as `95.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Overall model score, `0..=100`.
    pub ai_score: f64,
    /// Model recommendation label, e.g. `Recommended`.
    pub recommendation: String,
    /// Skills fit, `0..=100`.
    pub skills_match: f64,
    /// Experience fit, `0..=100`.
    pub experience_match: f64,
    /// Education fit, `0..=100`.
    pub education_match: f64,
    /// Notable strengths.
    #[serde(default)]
    pub key_strengths: Vec<String>,
    /// Topics worth probing in interview.
    #[serde(default)]
    pub areas_of_concern: Vec<String>,
    /// Missing or weak skills.
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    /// Short narrative summary.
    #[serde(default)]
    pub detailed_analysis: String,
}

impl ResumeAnalysis {
    /// Neutral analysis used when the model reply cannot be parsed.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            ai_score: 70.0,
            recommendation: "Consider".to_owned(),
            skills_match: 70.0,
            experience_match: 70.0,
            education_match: 70.0,
            key_strengths: vec!["Candidate profile reviewed".to_owned()],
            areas_of_concern: vec!["Detailed assessment pending".to_owned()],
            skill_gaps: vec!["Further evaluation needed".to_owned()],
            detailed_analysis: "AI analysis completed with basic evaluation.".to_owned(),
        }
    }

    /// Checks that every score is a finite number in `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::ScoreOutOfRange`] for the first score
    /// outside the range.
    pub fn validate(&self) -> Result<(), PipelineDomainError> {
        for (field, score) in [
            ("ai_score", self.ai_score),
            ("skills_match", self.skills_match),
            ("experience_match", self.experience_match),
            ("education_match", self.education_match),
        ] {
            if !(0.0..=100.0).contains(&score) {
                return Err(PipelineDomainError::ScoreOutOfRange {
                    field,
                    value: score.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the overall model score rounded to a whole number.
    #[must_use]
    pub fn rounded_ai_score(&self) -> u32 {
        round_score(self.ai_score)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is clamped to 0..=100 before the cast"
)]
fn round_score(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

/// Composite applicant-tracking score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtsScore(u32);

impl AtsScore {
    /// Highest possible score.
    pub const MAX: u32 = 100;

    const SKILLS_WEIGHT: f64 = 40.0;
    const EXPERIENCE_WEIGHT: f64 = 35.0;
    const EDUCATION_WEIGHT: f64 = 25.0;

    /// Weights skills 40%, experience 35% and education 25%, rounding half up.
    ///
    /// Out-of-range inputs are clamped; callers validate the analysis first.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "model scores are fractional and the weighting is defined on them"
    )]
    pub fn from_analysis(analysis: &ResumeAnalysis) -> Self {
        let weighted = analysis.skills_match * Self::SKILLS_WEIGHT
            + analysis.experience_match * Self::EXPERIENCE_WEIGHT
            + analysis.education_match * Self::EDUCATION_WEIGHT;
        Self(round_score(weighted / 100.0))
    }

    /// Returns the numeric score.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Threshold policy turning an ATS score into a screening decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningPolicy {
    selection_threshold: u32,
}

impl ScreeningPolicy {
    /// Threshold used by the hosted screening function.
    pub const DEFAULT_THRESHOLD: u32 = 75;

    /// Creates a policy that selects scores at or above `selection_threshold`.
    #[must_use]
    pub const fn new(selection_threshold: u32) -> Self {
        Self {
            selection_threshold,
        }
    }

    /// Returns the selection threshold.
    #[must_use]
    pub const fn selection_threshold(self) -> u32 {
        self.selection_threshold
    }

    /// Decides the screening outcome for `score`.
    #[must_use]
    pub const fn decide(self, score: AtsScore) -> ScreeningDecision {
        if score.value() >= self.selection_threshold {
            ScreeningDecision::Selected
        } else {
            ScreeningDecision::Rejected
        }
    }
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
