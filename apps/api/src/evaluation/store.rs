use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::evaluation::pipeline::Evaluation;
use crate::models::evaluation::{DashboardSummary, EvaluationRow};
use crate::models::job::JobDescriptionRow;
use crate::parsing::JobData;
use crate::scoring::aggregate::Verdict;

const LIST_LIMIT: i64 = 200;

/// Who and what an evaluation was about, beyond what the pipeline extracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationMeta<'a> {
    pub candidate_name: Option<&'a str>,
    pub resume_filename: Option<&'a str>,
}

pub async fn save_evaluation(
    pool: &PgPool,
    evaluation: &Evaluation,
    meta: EvaluationMeta<'_>,
) -> Result<(), sqlx::Error> {
    let b = &evaluation.breakdown;
    sqlx::query(
        r#"
        INSERT INTO evaluations
            (id, candidate_name, candidate_email, resume_filename, job_title,
             overall_score, hard_match_score, semantic_score, experience_score,
             verdict, score_basis, matched_skills, missing_required_skills,
             missing_preferred_skills, strengths, gaps, recommendations, degraded,
             feedback, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        "#,
    )
    .bind(evaluation.id)
    .bind(meta.candidate_name)
    .bind(evaluation.candidate_email.as_deref())
    .bind(meta.resume_filename)
    .bind(&evaluation.job_title)
    .bind(b.overall_score)
    .bind(b.hard_match_score)
    .bind(b.semantic_score)
    .bind(b.experience_score)
    .bind(b.verdict.as_str())
    .bind(b.score_basis.as_str())
    .bind(Json(&b.matched_skills))
    .bind(Json(&b.missing_required_skills))
    .bind(Json(&b.missing_preferred_skills))
    .bind(Json(&b.strengths))
    .bind(Json(&b.gaps))
    .bind(Json(&b.recommendations))
    .bind(Json(&evaluation.degraded))
    .bind(&evaluation.feedback)
    .bind(evaluation.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest first. `job_title` is a case-insensitive substring filter.
pub async fn list_evaluations(
    pool: &PgPool,
    job_title: Option<&str>,
    verdict: Option<Verdict>,
) -> Result<Vec<EvaluationRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM evaluations
        WHERE ($1::TEXT IS NULL OR job_title ILIKE '%' || $1 || '%')
          AND ($2::TEXT IS NULL OR verdict = $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(job_title)
    .bind(verdict.map(Verdict::as_str))
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn get_evaluation(pool: &PgPool, id: Uuid) -> Result<Option<EvaluationRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM evaluations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn dashboard_summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*)                                   AS total_evaluations,
            AVG(overall_score)                         AS average_score,
            COUNT(*) FILTER (WHERE verdict = 'HIGH')   AS high_count,
            COUNT(*) FILTER (WHERE verdict = 'MEDIUM') AS medium_count,
            COUNT(*) FILTER (WHERE verdict = 'LOW')    AS low_count
        FROM evaluations
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn save_job(
    pool: &PgPool,
    raw_text: &str,
    job: &JobData,
) -> Result<JobDescriptionRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO job_descriptions (id, title, raw_text, parsed)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&job.title)
    .bind(raw_text)
    .bind(Json(job))
    .fetch_one(pool)
    .await
}

pub async fn list_jobs(pool: &PgPool) -> Result<Vec<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM job_descriptions ORDER BY created_at DESC LIMIT $1")
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
}
