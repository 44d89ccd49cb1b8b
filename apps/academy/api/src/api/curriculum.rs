use axum::Router;
use domain_curriculum::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.curriculum.clone())
}
