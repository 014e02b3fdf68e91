// Persistence for pipeline documents. Each entity is one JSONB row keyed by its id.

use serde::de::DeserializeOwned;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::GapAnalysis;
use crate::curriculum::TrainingProgram;
use crate::extraction::models::{JobRequirement, ResumeProfile};

async fn fetch_document<T>(pool: &PgPool, sql: &'static str, id: Uuid) -> Result<Option<T>, sqlx::Error>
where
    T: DeserializeOwned + Send + Unpin + 'static,
{
    let row: Option<Json<T>> = sqlx::query_scalar(sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(|Json(document)| document))
}

pub async fn save_resume(pool: &PgPool, profile: &ResumeProfile) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO resumes (id, document, created_at) VALUES ($1, $2, $3)")
        .bind(profile.id)
        .bind(Json(profile))
        .bind(profile.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeProfile>, sqlx::Error> {
    fetch_document(pool, "SELECT document FROM resumes WHERE id = $1", id).await
}

pub async fn save_job(pool: &PgPool, job: &JobRequirement) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO job_descriptions (id, title, document, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(job.id)
    .bind(&job.title)
    .bind(Json(job))
    .bind(job.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRequirement>, sqlx::Error> {
    fetch_document(pool, "SELECT document FROM job_descriptions WHERE id = $1", id).await
}

pub async fn save_analysis(pool: &PgPool, analysis: &GapAnalysis) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO gap_analyses (id, resume_id, job_id, document, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(analysis.id)
    .bind(analysis.profile.id)
    .bind(analysis.job.id)
    .bind(Json(analysis))
    .bind(analysis.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_analysis(pool: &PgPool, id: Uuid) -> Result<Option<GapAnalysis>, sqlx::Error> {
    fetch_document(pool, "SELECT document FROM gap_analyses WHERE id = $1", id).await
}

pub async fn save_program(pool: &PgPool, program: &TrainingProgram) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO training_programs (id, gap_analysis_id, document, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(program.id)
    .bind(program.gap_analysis_id)
    .bind(Json(program))
    .bind(program.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_program(pool: &PgPool, id: Uuid) -> Result<Option<TrainingProgram>, sqlx::Error> {
    fetch_document(pool, "SELECT document FROM training_programs WHERE id = $1", id).await
}

/// Programs generated from one analysis, newest first.
pub async fn list_programs(
    pool: &PgPool,
    gap_analysis_id: Uuid,
) -> Result<Vec<TrainingProgram>, sqlx::Error> {
    let rows: Vec<Json<TrainingProgram>> = sqlx::query_scalar(
        r#"
        SELECT document
        FROM training_programs
        WHERE gap_analysis_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(gap_analysis_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|Json(program)| program).collect())
}
