use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::models::{DocumentKind, Extraction, JobPosting, JobRequirement, ResumeProfile};
use crate::extraction::upload::decode_upload;
use crate::state::AppState;
use crate::store;

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    pub kind: DocumentKind,
}

#[derive(Deserialize)]
pub struct ResumeTextRequest {
    pub text: String,
}

/// POST /api/v1/extract
/// Preview only; nothing is stored.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Extraction>, AppError> {
    Ok(Json(state.extractor.extract(&req.text, req.kind).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeTextRequest>,
) -> Result<(StatusCode, Json<ResumeProfile>), AppError> {
    let profile = state.extractor.resume_profile(&req.text).await?;
    store::save_resume(&state.db, &profile).await?;
    info!("Stored resume {} with {} skills", profile.id, profile.skills.len());
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /api/v1/resumes/upload
/// Multipart form with a `file` field (.pdf or .txt).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeProfile>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let text = decode_upload(&filename, &bytes)?;
        let profile = state.extractor.resume_profile(&text).await?;
        store::save_resume(&state.db, &profile).await?;
        info!(
            "Stored uploaded resume {} ({}, {} bytes)",
            profile.id,
            filename,
            bytes.len()
        );
        return Ok((StatusCode::CREATED, Json(profile)));
    }
    Err(AppError::Validation("multipart field 'file' is required".to_string()))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeProfile>, AppError> {
    store::get_resume(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("resume {id}")))
}

/// POST /api/v1/job-descriptions
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(posting): Json<JobPosting>,
) -> Result<(StatusCode, Json<JobRequirement>), AppError> {
    let job = state.extractor.job_requirement(posting).await?;
    store::save_job(&state.db, &job).await?;
    info!(
        "Stored job description {} ({} required, {} preferred)",
        job.id,
        job.required.len(),
        job.preferred.len()
    );
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/job-descriptions/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRequirement>, AppError> {
    store::get_job(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("job description {id}")))
}
