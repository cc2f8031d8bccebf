pub mod health;
pub mod page;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::suite::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé page
        .route("/", get(page::handle_resume_page))
        .route("/download", get(page::handle_download))
        // Career suite modal
        .route("/api/v1/suite", get(handlers::handle_get_view))
        .route("/api/v1/suite/open", post(handlers::handle_open))
        .route("/api/v1/suite/close", post(handlers::handle_close))
        .route("/api/v1/suite/toggle", post(handlers::handle_toggle))
        .route("/api/v1/suite/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/suite/actions/:action",
            post(handlers::handle_choose),
        )
        .route("/api/v1/suite/form", post(handlers::handle_submit_form))
        .route("/api/v1/suite/answer", post(handlers::handle_submit_answer))
        .route(
            "/api/v1/suite/key",
            post(handlers::handle_submit_key).delete(handlers::handle_clear_key),
        )
        .route(
            "/api/v1/suite/key/configure",
            post(handlers::handle_configure_key),
        )
        .with_state(state)
}
