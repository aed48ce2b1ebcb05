pub mod health;
pub mod recommendations;
pub mod tasks;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Task API — enqueue + status polling
        .route("/api/v1/tasks", post(tasks::handle_enqueue))
        .route("/api/v1/tasks/:id", get(tasks::handle_get_status))
        // Seeker-facing recommendation list (synchronous, tag-overlap)
        .route(
            "/api/v1/candidates/:id/recommendations",
            get(recommendations::handle_recommendations),
        )
        .with_state(state)
}
