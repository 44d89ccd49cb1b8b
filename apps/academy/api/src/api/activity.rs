use axum::Router;
use domain_activity::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router_with_shared(state.activity.clone())
}
