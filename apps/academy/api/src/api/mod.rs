use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;

use crate::state::AppState;

pub mod activity;
pub mod admin;
pub mod adventure;
pub mod curriculum;
pub mod health;
pub mod payments;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// Every route except the webhook sees the caller's Supabase claims when a
/// valid token is present. Required-auth and admin routes enforce further.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/curriculum", curriculum::router(state))
        .nest("/adventure", adventure::router(state))
        .nest("/payments", payments::router(state))
        .nest("/activity", activity::router(state))
        .nest("/admin", admin::router(state))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            optional_jwt_auth_middleware,
        ))
        .nest("/webhooks", payments::webhook_router(state))
}

/// `/ready` with its own state, merged beside the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
