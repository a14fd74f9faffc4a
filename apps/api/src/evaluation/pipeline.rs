use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::parsing::{JobData, JobParser, RegexJobParser, RegexResumeParser, ResumeParser};
use crate::scoring::aggregate::{aggregate, overall_score, ScoreBreakdown};
use crate::scoring::config::ScoringConfig;
use crate::scoring::experience::score_experience;
use crate::scoring::signals::{ExternalSignalAdapter, SignalSource};
use crate::scoring::skills::{score_skills, SkillMatch};

/// Caller misuse: the only failures allowed past the evaluation boundary.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("Resume text is empty")]
    EmptyResume,

    #[error("Job description text is empty")]
    EmptyJobDescription,
}

/// Where each externally-backed signal came from for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalProvenance {
    pub semantic: SignalSource,
    pub fit_analysis: SignalSource,
    pub feedback: SignalSource,
}

impl SignalProvenance {
    /// Names of the signals that did not come from the external service.
    pub fn degraded(&self) -> Vec<String> {
        [
            ("semantic_similarity", self.semantic),
            ("fit_analysis", self.fit_analysis),
            ("feedback", self.feedback),
        ]
        .into_iter()
        .filter(|(_, source)| *source != SignalSource::External)
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

/// Full result of scoring one resume against one job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub job_title: String,
    pub candidate_email: Option<String>,
    pub breakdown: ScoreBreakdown,
    pub feedback: String,
    /// Local SkillMatcher detail, independent of the external analysis.
    pub local_skill_match: SkillMatch,
    pub signals: SignalProvenance,
    pub degraded: Vec<String>,
    pub scoring: ScoringConfig,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeInput {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Success { evaluation: Box<Evaluation> },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn failed(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            outcome: BatchOutcome::Failed {
                error: error.to_string(),
            },
        }
    }
}

/// End-to-end pipeline: parse → skills → experience → semantic → fit analysis → aggregate → feedback.
#[derive(Clone)]
pub struct Evaluator {
    resume_parser: Arc<dyn ResumeParser>,
    job_parser: Arc<dyn JobParser>,
    signals: ExternalSignalAdapter,
}

impl Evaluator {
    pub fn new(
        resume_parser: Arc<dyn ResumeParser>,
        job_parser: Arc<dyn JobParser>,
        signals: ExternalSignalAdapter,
    ) -> Self {
        Self {
            resume_parser,
            job_parser,
            signals,
        }
    }

    pub fn with_regex_parsers(signals: ExternalSignalAdapter) -> Self {
        Self::new(Arc::new(RegexResumeParser), Arc::new(RegexJobParser), signals)
    }

    pub fn parse_job(&self, jd_text: &str) -> Result<JobData, EvaluationError> {
        if jd_text.trim().is_empty() {
            return Err(EvaluationError::EmptyJobDescription);
        }
        Ok(self.job_parser.parse_job(jd_text))
    }

    /// Scores a single resume. `config` is a snapshot; it is not re-read mid-evaluation.
    pub async fn evaluate(
        &self,
        resume_text: &str,
        jd_text: &str,
        config: ScoringConfig,
    ) -> Result<Evaluation, EvaluationError> {
        let job = self.parse_job(jd_text)?;
        self.evaluate_against(resume_text, jd_text, &job, config).await
    }

    /// Parses the job once and scores each resume in order. Per-item failures are
    /// reported in place and never stop the batch.
    pub async fn evaluate_batch(
        &self,
        jd_text: &str,
        resumes: Vec<ResumeInput>,
        config: ScoringConfig,
    ) -> Result<Vec<BatchItem>, EvaluationError> {
        let job = self.parse_job(jd_text)?;
        let total = resumes.len();
        let mut items = Vec::with_capacity(total);

        for (index, resume) in resumes.into_iter().enumerate() {
            let outcome = match self
                .evaluate_against(&resume.text, jd_text, &job, config)
                .await
            {
                Ok(evaluation) => BatchOutcome::Success {
                    evaluation: Box::new(evaluation),
                },
                Err(e) => {
                    warn!("Batch item {}/{} ({}) failed: {e}", index + 1, total, resume.filename);
                    BatchOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            items.push(BatchItem {
                filename: resume.filename,
                outcome,
            });
        }

        info!("Batch evaluation finished: {total} resumes against '{}'", job.title);
        Ok(items)
    }

    async fn evaluate_against(
        &self,
        resume_text: &str,
        jd_text: &str,
        job: &JobData,
        config: ScoringConfig,
    ) -> Result<Evaluation, EvaluationError> {
        if resume_text.trim().is_empty() {
            return Err(EvaluationError::EmptyResume);
        }

        let resume = self.resume_parser.parse_resume(resume_text);
        let requirement = job.requirement_spec();

        let local_skill_match = score_skills(&resume.skill_set(), resume_text, &requirement);
        let experience_score = score_experience(
            &resume.experience,
            requirement.experience_requirement.as_deref(),
        );
        let semantic = self.signals.semantic_similarity(resume_text, jd_text).await;
        let analysis = self.signals.analyze_fit(&resume, job).await;

        let breakdown = aggregate(
            local_skill_match.hard_match_score,
            semantic.score,
            experience_score,
            &analysis,
            &config.weights,
            &config.thresholds,
        );
        // Feedback bands follow the unrounded score, as the verdict does.
        let (overall, _) = overall_score(
            local_skill_match.hard_match_score,
            semantic.score,
            experience_score,
            &analysis,
            &config.weights,
        );
        let feedback = self.signals.generate_feedback(&breakdown, overall).await;

        let signals = SignalProvenance {
            semantic: semantic.source,
            fit_analysis: analysis.source,
            feedback: feedback.source,
        };

        info!(
            "Evaluated resume for '{}': score={} verdict={} basis={:?}",
            job.title,
            breakdown.overall_score,
            breakdown.verdict.as_str(),
            breakdown.score_basis
        );

        Ok(Evaluation {
            id: Uuid::new_v4(),
            job_title: job.title.clone(),
            candidate_email: resume.contact.email,
            breakdown,
            feedback: feedback.text,
            local_skill_match,
            degraded: signals.degraded(),
            signals,
            scoring: config,
            created_at: Utc::now(),
        })
    }
}
