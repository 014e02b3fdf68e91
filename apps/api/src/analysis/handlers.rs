use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{analyze, GapAnalysis};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store;

#[derive(Deserialize)]
pub struct GapAnalysisRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

/// POST /api/v1/gap-analysis
pub async fn handle_create_analysis(
    State(state): State<AppState>,
    Json(req): Json<GapAnalysisRequest>,
) -> Result<(StatusCode, Json<GapAnalysis>), AppError> {
    let profile = store::get_resume(&state.db, req.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume {}", req.resume_id)))?;
    let job = store::get_job(&state.db, req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job description {}", req.job_id)))?;

    let analysis = analyze(profile, job);
    store::save_analysis(&state.db, &analysis).await?;
    info!(
        "Stored gap analysis {}: {} gaps, confidence {}",
        analysis.id,
        analysis.gaps.len(),
        analysis.confidence_score
    );
    Ok((StatusCode::CREATED, Json(analysis)))
}

/// GET /api/v1/gap-analysis/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GapAnalysis>, AppError> {
    store::get_analysis(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("gap analysis {id}")))
}
