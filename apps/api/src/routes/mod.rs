pub mod evaluations;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Parsing
        .route("/api/v1/jobs/parse", post(evaluations::handle_parse_jds))
        .route("/api/v1/resumes/parse", post(evaluations::handle_parse_cvs))
        // Evaluation
        .route(
            "/api/v1/applications/:id/evaluate",
            post(evaluations::handle_evaluate_application),
        )
        .route(
            "/api/v1/evaluations/run",
            post(evaluations::handle_run_evaluations),
        )
        .route(
            "/api/v1/applications/:id",
            get(evaluations::handle_get_application),
        )
        .with_state(state)
}
