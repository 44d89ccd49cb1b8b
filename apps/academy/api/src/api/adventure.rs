use axum::Router;
use domain_adventure::handlers;

use crate::api::admin;
use crate::state::AppState;

/// Path-selection routes plus the admin-only embedding pipeline.
pub fn router(state: &AppState) -> Router {
    let pipeline = admin::protect(
        handlers::admin_router(state.adventure.clone()),
        state.curriculum.clone(),
    );
    handlers::router(state.adventure.clone()).merge(pipeline)
}
