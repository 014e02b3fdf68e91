use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::GapAnalysis;
use crate::curriculum::{ProjectBrief, TrainingProgram};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store;

#[derive(Deserialize)]
pub struct ProgramRequest {
    pub gap_analysis_id: Uuid,
}

#[derive(Deserialize)]
pub struct ProjectProgramRequest {
    pub gap_analysis_id: Uuid,
    pub project: ProjectBrief,
}

#[derive(Deserialize)]
pub struct ProgramListQuery {
    pub gap_analysis_id: Uuid,
}

async fn load_analysis(state: &AppState, id: Uuid) -> Result<GapAnalysis, AppError> {
    store::get_analysis(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("gap analysis {id}")))
}

/// POST /api/v1/training-programs
pub async fn handle_create_program(
    State(state): State<AppState>,
    Json(req): Json<ProgramRequest>,
) -> Result<(StatusCode, Json<TrainingProgram>), AppError> {
    let analysis = load_analysis(&state, req.gap_analysis_id).await?;
    let _permit = state.locks.acquire(analysis.id).await;
    let program = state.orchestrator.generate_foundation_program(&analysis).await?;
    store::save_program(&state.db, &program).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

/// POST /api/v1/training-programs/project
pub async fn handle_create_project_program(
    State(state): State<AppState>,
    Json(req): Json<ProjectProgramRequest>,
) -> Result<(StatusCode, Json<TrainingProgram>), AppError> {
    let analysis = load_analysis(&state, req.gap_analysis_id).await?;
    let _permit = state.locks.acquire(analysis.id).await;
    let program = state
        .orchestrator
        .generate_project_program(&analysis, &req.project)
        .await?;
    store::save_program(&state.db, &program).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

/// GET /api/v1/training-programs/:id
pub async fn handle_get_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainingProgram>, AppError> {
    store::get_program(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("training program {id}")))
}

/// GET /api/v1/training-programs?gap_analysis_id=
pub async fn handle_list_programs(
    State(state): State<AppState>,
    Query(params): Query<ProgramListQuery>,
) -> Result<Json<Vec<TrainingProgram>>, AppError> {
    Ok(Json(store::list_programs(&state.db, params.gap_analysis_id).await?))
}
