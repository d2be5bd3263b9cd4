pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/models", get(handlers::handle_list_models))
        .route("/api/v1/cv", post(handlers::handle_generate_cv))
        .with_state(state)
}
