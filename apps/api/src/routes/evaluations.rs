//! Axum route handlers for parsing and evaluation. Handlers stay thin; the
//! pipeline does the work.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::pipeline::{BatchItem, BatchReport, Pipeline};
use crate::scoring::composite::ScoreBreakdown;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub total: usize,
    pub results: Vec<BatchItem>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub application_id: Uuid,
    pub breakdown: ScoreBreakdown,
}

/// POST /api/v1/jobs/parse
///
/// Parses every active job's JD PDF into a structured record. Per-job
/// failures are reported inline, never fatal.
pub async fn handle_parse_jds(
    State(state): State<AppState>,
) -> Result<Json<ParseResponse>, AppError> {
    let pipeline = Pipeline::new(&state);
    let results = pipeline.parse_all_jds().await?;
    Ok(Json(ParseResponse {
        total: results.len(),
        results,
    }))
}

/// POST /api/v1/resumes/parse
///
/// Parses every uploaded résumé into a structured record.
pub async fn handle_parse_cvs(
    State(state): State<AppState>,
) -> Result<Json<ParseResponse>, AppError> {
    let pipeline = Pipeline::new(&state);
    let results = pipeline.parse_all_cvs().await?;
    Ok(Json(ParseResponse {
        total: results.len(),
        results,
    }))
}

/// POST /api/v1/applications/:id/evaluate
///
/// Quantitative evaluation of one application: eligibility gate plus the
/// skill/course/semantic signals. Recomputing is safe; the row is simply
/// overwritten.
pub async fn handle_evaluate_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let pipeline = Pipeline::new(&state);
    let breakdown = pipeline.evaluate_application(application_id).await?;
    Ok(Json(EvaluateResponse {
        application_id,
        breakdown,
    }))
}

/// POST /api/v1/evaluations/run
///
/// Batch evaluation of every unscored application, with the narrative
/// feedback blend. Each pair runs concurrently under the pipeline's worker
/// bounds.
pub async fn handle_run_evaluations(
    State(state): State<AppState>,
) -> Result<Json<BatchReport>, AppError> {
    let pipeline = Pipeline::new(&state);
    let report = pipeline.evaluate_pending_with_feedback().await?;
    Ok(Json(report))
}

/// GET /api/v1/applications/:id
///
/// Returns the application row including any stored evaluation outcome.
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
    Ok(Json(application))
}
