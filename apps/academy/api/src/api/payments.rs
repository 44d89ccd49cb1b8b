use axum::Router;
use domain_payments::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.payments.clone())
}

/// Signature-authenticated provider callbacks.
pub fn webhook_router(state: &AppState) -> Router {
    handlers::webhook_router(state.payments.clone())
}
