use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ActivityResult;
use crate::models::{ActivityLog, StudyDownload};
use crate::repository::ActivityRepository;
use crate::service::ActivityService;

pub const TAG: &str = "activity";

/// OpenAPI documentation for the activity API
#[derive(OpenApi)]
#[openapi(
    paths(log_study_download),
    components(
        schemas(ActivityLog, StudyDownload),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Learner telemetry")
    )
)]
pub struct ApiDoc;

/// Activity router. Expects the auth middleware to be layered by the caller.
pub fn router<R: ActivityRepository + 'static>(service: ActivityService<R>) -> Router {
    router_with_shared(Arc::new(service))
}

/// Same as [`router`] for a service that is also shared elsewhere.
pub fn router_with_shared<R: ActivityRepository + 'static>(
    service: Arc<ActivityService<R>>,
) -> Router {
    Router::new()
        .route("/study-downloads", post(log_study_download))
        .with_state(service)
}

/// Record a study asset download
#[utoipa::path(
    post,
    path = "/study-downloads",
    tag = TAG,
    request_body = StudyDownload,
    responses(
        (status = 201, description = "Download recorded", body = ActivityLog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn log_study_download<R: ActivityRepository>(
    State(service): State<Arc<ActivityService<R>>>,
    user: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<StudyDownload>,
) -> ActivityResult<impl IntoResponse> {
    let video_id = input.video_id;
    let log = service.log_study_download(user.id, input).await?;

    AuditEvent::new(
        Some(user.id),
        "study_asset.download",
        Some(format!("video:{}", video_id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({ "asset_type": log.metadata.get("asset_type") }))
    .log();

    Ok((StatusCode::CREATED, Json(log)))
}
