//! External Signal Adapter: wraps the embedding and chat model collaborators.
//!
//! Every operation here returns a usable value. External failures (auth, network,
//! timeout, malformed output) only lower signal quality:
//!
//! - semantic similarity: embeddings → bag-of-words Jaccard → neutral 50
//! - fit analysis: model JSON → local set-algebra analysis (unusable output)
//!   or conservative defaults (no model / call failed)
//! - feedback: model text → score-band template

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm_client::embeddings::cosine_similarity;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, RECRUITER_PERSONA};
use crate::llm_client::{extract_json_object, Embedder, LanguageModel, LlmError};
use crate::parsing::{JobData, ResumeData};
use crate::scoring::aggregate::ScoreBreakdown;
use crate::scoring::prompts::{FEEDBACK_PROMPT_TEMPLATE, FIT_ANALYSIS_PROMPT_TEMPLATE};

const NEUTRAL_SEMANTIC_SCORE: f64 = 50.0;
const LOCAL_BASE_PERCENTAGE: f64 = 60.0;
const LOCAL_REQUIRED_BONUS: f64 = 10.0;
const LOCAL_PREFERRED_BONUS: f64 = 5.0;
const FEEDBACK_STRONG_BAND: f64 = 75.0;
const FEEDBACK_MODERATE_BAND: f64 = 50.0;
const FEEDBACK_TOP_GAPS: usize = 3;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Where a signal came from: the external service, a local fallback, or a fixed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    External,
    Fallback,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticSignal {
    pub score: f64,
    pub source: SignalSource,
}

/// Holistic fit judgment. Always constructible; every field has a safe default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAnalysis {
    pub match_percentage: Option<f64>,
    pub matched_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub missing_preferred_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
    pub source: SignalSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    pub source: SignalSource,
}

impl ExternalAnalysis {
    /// Conservative result when no analysis could be obtained at all:
    /// no percentage (forces the weighted path) and every required skill listed as missing.
    pub fn unavailable(job: &JobData) -> Self {
        Self {
            match_percentage: None,
            matched_skills: Vec::new(),
            missing_required_skills: job.required_skills.clone(),
            missing_preferred_skills: Vec::new(),
            strengths: Vec::new(),
            gaps: vec!["Skill coverage could not be verified by external analysis".to_string()],
            recommendations: vec![
                "Review the required skills and make sure each one is evidenced in your resume"
                    .to_string(),
            ],
            source: SignalSource::Default,
        }
    }

    /// Set-algebra analysis over resume skills vs. required / preferred skills.
    pub fn local(resume: &ResumeData, job: &JobData) -> Self {
        let resume_skills: HashSet<String> =
            resume.skills.iter().map(|s| s.trim().to_lowercase()).collect();
        let has = |skill: &String| resume_skills.contains(&skill.trim().to_lowercase());

        let (matched_required, missing_required): (Vec<String>, Vec<String>) =
            job.required_skills.iter().cloned().partition(|s| has(s));
        let (matched_preferred, missing_preferred): (Vec<String>, Vec<String>) =
            job.preferred_skills.iter().cloned().partition(|s| has(s));

        let match_percentage = (LOCAL_BASE_PERCENTAGE
            + LOCAL_REQUIRED_BONUS * matched_required.len() as f64
            + LOCAL_PREFERRED_BONUS * matched_preferred.len() as f64)
            .min(100.0);

        let mut strengths = Vec::new();
        if !matched_required.is_empty() {
            strengths.push(format!(
                "Covers {} of {} required skills: {}",
                matched_required.len(),
                job.required_skills.len(),
                matched_required.join(", ")
            ));
        }
        if !matched_preferred.is_empty() {
            strengths.push(format!(
                "Brings preferred skills: {}",
                matched_preferred.join(", ")
            ));
        }

        let mut gaps = Vec::new();
        if !missing_required.is_empty() {
            gaps.push(format!("Missing required skills: {}", missing_required.join(", ")));
        }
        if !missing_preferred.is_empty() {
            gaps.push(format!(
                "Missing preferred skills: {}",
                missing_preferred.join(", ")
            ));
        }

        let mut recommendations: Vec<String> = missing_required
            .iter()
            .map(|s| format!("Gain and document hands-on experience with {s}"))
            .collect();
        if !missing_preferred.is_empty() {
            recommendations.push(format!(
                "Consider building exposure to {}",
                missing_preferred.join(", ")
            ));
        }
        if recommendations.is_empty() {
            recommendations
                .push("Quantify the impact of your work with the listed skills".to_string());
        }

        Self {
            match_percentage: Some(match_percentage),
            matched_skills: matched_required.into_iter().chain(matched_preferred).collect(),
            missing_required_skills: missing_required,
            missing_preferred_skills: missing_preferred,
            strengths,
            gaps,
            recommendations,
            source: SignalSource::Fallback,
        }
    }

    /// Parses model output: the first balanced JSON object is read field by field.
    /// Absent or ill-typed fields take their safe defaults.
    pub fn from_model_output(text: &str, job: &JobData) -> Result<Self, LlmError> {
        let json = extract_json_object(text).ok_or(LlmError::NoJsonObject)?;
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(fields) = value else {
            return Err(LlmError::NoJsonObject);
        };

        Ok(Self {
            match_percentage: fields.get("match_percentage").and_then(parse_percentage),
            matched_skills: string_list(&fields, "matched_skills").unwrap_or_default(),
            missing_required_skills: string_list(&fields, "missing_required_skills")
                .unwrap_or_else(|| job.required_skills.clone()),
            missing_preferred_skills: string_list(&fields, "missing_preferred_skills")
                .unwrap_or_default(),
            strengths: string_list(&fields, "strengths").unwrap_or_default(),
            gaps: string_list(&fields, "gaps").unwrap_or_default(),
            recommendations: string_list(&fields, "recommendations").unwrap_or_default(),
            source: SignalSource::External,
        })
    }
}

/// Accepts a number or a numeric string such as "82%"; clamps into 0–100.
fn parse_percentage(value: &Value) -> Option<f64> {
    let pct = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => NUMBER.find(s)?.as_str().parse().ok()?,
        _ => return None,
    };
    pct.is_finite().then(|| pct.clamp(0.0, 100.0))
}

/// Accepts an array (non-string items are skipped) or a comma-separated string.
fn string_list(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match fields.get(key)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local similarity
// ────────────────────────────────────────────────────────────────────────────

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Intersection over union of lower-cased token sets, scaled to 0–100.
/// `None` when both texts are empty.
pub fn jaccard_similarity(a: &str, b: &str) -> Option<f64> {
    let ta = tokenize(a);
    let tb = tokenize(b);
    let union = ta.union(&tb).count();
    if union == 0 {
        return None;
    }
    let intersection = ta.intersection(&tb).count();
    Some(intersection as f64 / union as f64 * 100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Adapter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ExternalSignalAdapter {
    model: Option<Arc<dyn LanguageModel>>,
    embedder: Option<Arc<dyn Embedder>>,
    timeout: Duration,
}

impl ExternalSignalAdapter {
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        embedder: Option<Arc<dyn Embedder>>,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            embedder,
            timeout,
        }
    }

    /// Runs an external call under the adapter's timeout; elapsed time is just another failure.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, LlmError>>,
    ) -> Result<T, LlmError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
    }

    pub async fn semantic_similarity(&self, resume_text: &str, job_text: &str) -> SemanticSignal {
        if let Some(embedder) = &self.embedder {
            let call = async {
                let resume_vec = embedder.embed(resume_text).await?;
                let job_vec = embedder.embed(job_text).await?;
                cosine_similarity(&resume_vec, &job_vec)
            };
            match self.bounded(call).await {
                Ok(similarity) => {
                    return SemanticSignal {
                        score: (similarity * 100.0).clamp(0.0, 100.0),
                        source: SignalSource::External,
                    }
                }
                Err(e) => warn!("Embedding similarity failed, falling back to Jaccard: {e}"),
            }
        }

        match jaccard_similarity(resume_text, job_text) {
            Some(score) => SemanticSignal {
                score,
                source: SignalSource::Fallback,
            },
            None => {
                debug!("No tokens to compare, using neutral semantic score");
                SemanticSignal {
                    score: NEUTRAL_SEMANTIC_SCORE,
                    source: SignalSource::Default,
                }
            }
        }
    }

    pub async fn analyze_fit(&self, resume: &ResumeData, job: &JobData) -> ExternalAnalysis {
        let Some(model) = &self.model else {
            debug!("No language model configured, using conservative analysis defaults");
            return ExternalAnalysis::unavailable(job);
        };

        let prompt = FIT_ANALYSIS_PROMPT_TEMPLATE
            .replace(
                "{resume_json}",
                &serde_json::to_string_pretty(resume).unwrap_or_default(),
            )
            .replace(
                "{job_json}",
                &serde_json::to_string_pretty(job).unwrap_or_default(),
            )
            .replace("{required_skills}", &job.required_skills.join(", "))
            .replace("{preferred_skills}", &job.preferred_skills.join(", "));
        let system = format!("{RECRUITER_PERSONA} {JSON_ONLY_INSTRUCTION}");

        let text = match self.bounded(model.complete(&prompt, &system)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Fit analysis call failed, using conservative defaults: {e}");
                return ExternalAnalysis::unavailable(job);
            }
        };

        match ExternalAnalysis::from_model_output(&text, job) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Fit analysis output unusable, using local analysis: {e}");
                ExternalAnalysis::local(resume, job)
            }
        }
    }

    pub async fn generate_feedback(&self, breakdown: &ScoreBreakdown, score: f64) -> Feedback {
        if let Some(model) = &self.model {
            let prompt = FEEDBACK_PROMPT_TEMPLATE
                .replace("{score}", &format!("{score:.0}"))
                .replace(
                    "{analysis_json}",
                    &serde_json::to_string_pretty(breakdown).unwrap_or_default(),
                );

            match self.bounded(model.complete(&prompt, RECRUITER_PERSONA)).await {
                Ok(text) => {
                    return Feedback {
                        text: text.trim().to_string(),
                        source: SignalSource::External,
                    }
                }
                Err(e) => warn!("Feedback generation failed, using template: {e}"),
            }
        }

        Feedback {
            text: template_feedback(breakdown, score),
            source: SignalSource::Fallback,
        }
    }
}

fn template_feedback(breakdown: &ScoreBreakdown, score: f64) -> String {
    let top_gaps: Vec<&str> = breakdown
        .missing_required_skills
        .iter()
        .take(FEEDBACK_TOP_GAPS)
        .map(String::as_str)
        .collect();

    if score >= FEEDBACK_STRONG_BAND {
        if top_gaps.is_empty() {
            format!("Strong match ({score:.0}/100). Your background aligns well with this role's requirements.")
        } else {
            format!(
                "Strong match ({score:.0}/100). To stand out further, make your experience with {} explicit.",
                top_gaps.join(", ")
            )
        }
    } else if score >= FEEDBACK_MODERATE_BAND {
        if top_gaps.is_empty() {
            format!("Moderate match ({score:.0}/100). Highlight measurable results in the areas this role emphasizes.")
        } else {
            format!(
                "Moderate match ({score:.0}/100). Strengthen your application by addressing: {}.",
                top_gaps.join(", ")
            )
        }
    } else if top_gaps.is_empty() {
        format!("Low match ({score:.0}/100). Review the job requirements and update your resume to reflect directly relevant experience.")
    } else {
        format!(
            "Low match ({score:.0}/100). The role requires skills not evident in your resume: {}. Consider building experience in these areas and updating your resume accordingly.",
            top_gaps.join(", ")
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
