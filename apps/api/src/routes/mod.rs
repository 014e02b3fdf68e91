pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::curriculum::handlers as curriculum;
use crate::extraction::handlers as extraction;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction
        .route("/api/v1/extract", post(extraction::handle_extract))
        .route("/api/v1/resumes", post(extraction::handle_create_resume))
        .route("/api/v1/resumes/upload", post(extraction::handle_upload_resume))
        .route("/api/v1/resumes/:id", get(extraction::handle_get_resume))
        .route("/api/v1/job-descriptions", post(extraction::handle_create_job))
        .route("/api/v1/job-descriptions/:id", get(extraction::handle_get_job))
        // Gap analysis
        .route("/api/v1/gap-analysis", post(analysis::handle_create_analysis))
        .route("/api/v1/gap-analysis/:id", get(analysis::handle_get_analysis))
        // Training programs
        .route(
            "/api/v1/training-programs",
            get(curriculum::handle_list_programs).post(curriculum::handle_create_program),
        )
        .route(
            "/api/v1/training-programs/project",
            post(curriculum::handle_create_project_program),
        )
        .route(
            "/api/v1/training-programs/:id",
            get(curriculum::handle_get_program),
        )
        .with_state(state)
}
