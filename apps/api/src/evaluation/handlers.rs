use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::pipeline::{BatchItem, BatchOutcome, Evaluation, ResumeInput};
use crate::evaluation::store::{self, EvaluationMeta};
use crate::models::evaluation::{DashboardSummary, EvaluationRow};
use crate::models::job::JobDescriptionRow;
use crate::parsing::document::extract_text;
use crate::scoring::aggregate::Verdict;
use crate::scoring::config::ScoringConfig;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub resume_text: String,
    pub jd_text: String,
    #[serde(alias = "candidate")]
    pub candidate_name: Option<String>,
    pub resume_filename: Option<String>,
    /// Per-request override of the active scoring config.
    pub scoring: Option<ScoringConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub jd_text: String,
    pub resumes: Vec<ResumeInput>,
    pub scoring: Option<ScoringConfig>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl BatchResponse {
    fn from_items(items: Vec<BatchItem>) -> Self {
        let succeeded = items
            .iter()
            .filter(|i| matches!(i.outcome, BatchOutcome::Success { .. }))
            .count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EvaluationFilter {
    pub job_title: Option<String>,
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub jd_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Validated override, or a copy of the active config taken now.
async fn resolve_scoring(
    state: &AppState,
    requested: Option<ScoringConfig>,
) -> Result<ScoringConfig, AppError> {
    match requested {
        Some(config) => {
            config.validate()?;
            Ok(config)
        }
        None => Ok(state.scoring_snapshot().await),
    }
}

/// Storage is best-effort: a failed insert never withholds the evaluation from the caller.
async fn persist(state: &AppState, evaluation: &Evaluation, meta: EvaluationMeta<'_>) {
    if let Err(e) = store::save_evaluation(&state.db, evaluation, meta).await {
        error!("Failed to persist evaluation {}: {e}", evaluation.id);
    }
}

async fn persist_batch(state: &AppState, items: &[BatchItem]) {
    for item in items {
        if let BatchOutcome::Success { evaluation } = &item.outcome {
            let meta = EvaluationMeta {
                candidate_name: None,
                resume_filename: Some(&item.filename),
            };
            persist(state, evaluation, meta).await;
        }
    }
}

/// Interleaves evaluated items with extraction failures at their upload positions.
/// `evaluated` is in upload order among the readable files; `failures` is sorted by position.
fn in_upload_order(
    evaluated: Vec<BatchItem>,
    failures: Vec<(usize, BatchItem)>,
) -> Vec<BatchItem> {
    let total = evaluated.len() + failures.len();
    let mut evaluated = evaluated.into_iter();
    let mut failures = failures.into_iter().peekable();

    (0..total)
        .filter_map(|position| match failures.peek() {
            Some((at, _)) if *at == position => failures.next().map(|(_, item)| item),
            _ => evaluated.next(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluations
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<Evaluation>, AppError> {
    let scoring = resolve_scoring(&state, req.scoring).await?;
    let evaluation = state
        .evaluator
        .evaluate(&req.resume_text, &req.jd_text, scoring)
        .await?;

    let meta = EvaluationMeta {
        candidate_name: req.candidate_name.as_deref(),
        resume_filename: req.resume_filename.as_deref(),
    };
    persist(&state, &evaluation, meta).await;

    Ok(Json(evaluation))
}

/// POST /api/v1/evaluations/batch
pub async fn handle_evaluate_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    if req.resumes.is_empty() {
        return Err(AppError::Validation("At least one resume is required".to_string()));
    }
    let scoring = resolve_scoring(&state, req.scoring).await?;
    let items = state
        .evaluator
        .evaluate_batch(&req.jd_text, req.resumes, scoring)
        .await?;

    persist_batch(&state, &items).await;
    Ok(Json(BatchResponse::from_items(items)))
}

/// POST /api/v1/evaluations/upload
///
/// Multipart form: exactly one `jd` file and one or more `resume` files
/// (.pdf, .docx, .txt, .md). Resumes that fail text extraction are reported
/// as failed items; a JD that fails extraction rejects the whole request.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let mut jd_text: Option<String> = None;
    let mut resumes = Vec::new();
    let mut extraction_failures = Vec::new();
    let mut resume_count = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{filename}': {e}")))?;

        match name.as_str() {
            "jd" => {
                if jd_text.is_some() {
                    return Err(AppError::Validation(
                        "Only one job description file may be uploaded".to_string(),
                    ));
                }
                jd_text = Some(extract_text(&filename, &bytes)?);
            }
            "resume" => {
                match extract_text(&filename, &bytes) {
                    Ok(text) => resumes.push(ResumeInput { filename, text }),
                    Err(e) => {
                        extraction_failures.push((resume_count, BatchItem::failed(filename, e)))
                    }
                }
                resume_count += 1;
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    let jd_text =
        jd_text.ok_or_else(|| AppError::Validation("Missing 'jd' file".to_string()))?;
    if resumes.is_empty() && extraction_failures.is_empty() {
        return Err(AppError::Validation("Missing 'resume' file".to_string()));
    }

    info!(
        "Upload received: {} resumes ({} unreadable)",
        resumes.len() + extraction_failures.len(),
        extraction_failures.len()
    );

    let scoring = state.scoring_snapshot().await;
    let evaluated = state
        .evaluator
        .evaluate_batch(&jd_text, resumes, scoring)
        .await?;
    persist_batch(&state, &evaluated).await;

    let items = in_upload_order(evaluated, extraction_failures);
    Ok(Json(BatchResponse::from_items(items)))
}

/// GET /api/v1/evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Query(filter): Query<EvaluationFilter>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let rows =
        store::list_evaluations(&state.db, filter.job_title.as_deref(), filter.verdict).await?;
    Ok(Json(rows))
}

/// GET /api/v1/evaluations/:id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationRow>, AppError> {
    let row = store::get_evaluation(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(store::dashboard_summary(&state.db).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Job descriptions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<JobDescriptionRow>, AppError> {
    let job = state.evaluator.parse_job(&req.jd_text)?;
    let row = store::save_job(&state.db, &req.jd_text, &job).await?;
    info!("Stored job description '{}' ({})", row.title, row.id);
    Ok(Json(row))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    Ok(Json(store::list_jobs(&state.db).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<ScoringConfig> {
    Json(state.scoring_snapshot().await)
}

/// PUT /api/v1/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(config): Json<ScoringConfig>,
) -> Result<Json<ScoringConfig>, AppError> {
    config.validate()?;
    *state.active_scoring.write().await = config;
    info!(
        "Active scoring config updated: weights={:?} thresholds={:?}",
        config.weights, config.thresholds
    );
    Ok(Json(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Outcome is irrelevant to ordering; only the filename is checked.
    fn item(filename: &str) -> BatchItem {
        BatchItem::failed(filename, "Resume text is empty")
    }

    fn filenames(items: &[BatchItem]) -> Vec<&str> {
        items.iter().map(|i| i.filename.as_str()).collect()
    }

    #[test]
    fn test_in_upload_order_interleaves_failures() {
        let evaluated = vec![item("b.txt"), item("d.txt")];
        let failures = vec![
            (0, BatchItem::failed("a.doc", "Unsupported file type: a.doc")),
            (2, BatchItem::failed("c.doc", "Unsupported file type: c.doc")),
            (4, BatchItem::failed("e.doc", "Unsupported file type: e.doc")),
        ];
        let items = in_upload_order(evaluated, failures);
        assert_eq!(
            filenames(&items),
            vec!["a.doc", "b.txt", "c.doc", "d.txt", "e.doc"]
        );
    }

    #[test]
    fn test_in_upload_order_without_failures_is_unchanged() {
        let items = in_upload_order(vec![item("a.txt"), item("b.txt")], Vec::new());
        assert_eq!(filenames(&items), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_evaluate_request_accepts_candidate_alias() {
        let req: EvaluateRequest = serde_json::from_value(serde_json::json!({
            "resume_text": "r",
            "jd_text": "j",
            "candidate": "Alex Kim"
        }))
        .unwrap();
        assert_eq!(req.candidate_name.as_deref(), Some("Alex Kim"));
        assert_eq!(req.resume_filename, None);
    }
}
