//! Admin gate and the `/admin` routes.

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use axum_helpers::{AppError, AuditEvent, AuditOutcome, AuthUser};
use domain_curriculum::{CurriculumRepository, CurriculumService, handlers};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    protect(handlers::admin_router(state.curriculum.clone()), state.curriculum.clone())
}

/// Put `router` behind the admin gate.
///
/// Expects JWT claims to already be in request extensions; the caller layers
/// optional auth outside this.
pub fn protect<R: CurriculumRepository + 'static>(
    router: Router,
    curriculum: Arc<CurriculumService<R>>,
) -> Router {
    router.layer(middleware::from_fn_with_state(curriculum, require_admin::<R>))
}

/// 401 without a signed-in caller, 403 unless their profile role is `admin`.
pub async fn require_admin<R: CurriculumRepository>(
    State(curriculum): State<Arc<CurriculumService<R>>>,
    user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_admin = curriculum.is_admin(user.id).await.map_err(AppError::from)?;

    if !is_admin {
        AuditEvent::new(
            Some(user.id),
            "admin.access",
            Some(request.uri().path().to_string()),
            AuditOutcome::Denied,
        )
        .with_request_headers(request.headers())
        .log();
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}
