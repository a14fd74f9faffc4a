use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub resume_filename: Option<String>,
    pub job_title: String,
    pub overall_score: f64,
    pub hard_match_score: f64,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub verdict: String,
    pub score_basis: String,
    pub matched_skills: Value,
    pub missing_required_skills: Value,
    pub missing_preferred_skills: Value,
    pub strengths: Value,
    pub gaps: Value,
    pub recommendations: Value,
    pub degraded: Value,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate view over all stored evaluations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DashboardSummary {
    pub total_evaluations: i64,
    /// `None` until the first evaluation is stored.
    pub average_score: Option<f64>,
    pub high_count: i64,
    pub medium_count: i64,
    pub low_count: i64,
}
