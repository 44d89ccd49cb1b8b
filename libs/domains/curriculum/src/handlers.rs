use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, put},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, MaybeAuthUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CurriculumResult;
use crate::models::{
    AdminStats, ContentCounts, Logbook, LogbookChapter, LogbookSection, LogbookVideo,
    PlaybackResponse, ProgressUpdate, Transcript, VideoSummary, WatchProgress,
};
use crate::repository::CurriculumRepository;
use crate::service::CurriculumService;

pub const TAG: &str = "curriculum";
pub const ADMIN_TAG: &str = "admin";

/// OpenAPI documentation for the curriculum API
#[derive(OpenApi)]
#[openapi(
    paths(
        get_logbook,
        get_opener,
        get_video,
        get_transcript,
        get_playback,
        put_progress,
    ),
    components(
        schemas(
            Logbook,
            LogbookSection,
            LogbookChapter,
            LogbookVideo,
            VideoSummary,
            Transcript,
            PlaybackResponse,
            ProgressUpdate,
            WatchProgress
        ),
        responses(
            NotFoundResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Curriculum browsing, playback and progress")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the admin dashboard
#[derive(OpenApi)]
#[openapi(
    paths(get_admin_stats),
    components(
        schemas(AdminStats, ContentCounts),
        responses(UnauthorizedResponse, ForbiddenResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = ADMIN_TAG, description = "Admin dashboard")
    )
)]
pub struct AdminApiDoc;

/// Curriculum routes. The caller layers optional auth in front; routes that
/// need a user reject anonymous requests through [`AuthUser`].
pub fn router<R: CurriculumRepository + 'static>(service: Arc<CurriculumService<R>>) -> Router {
    Router::new()
        .route("/logbook", get(get_logbook))
        .route("/opener", get(get_opener))
        .route("/videos/{id}", get(get_video))
        .route("/videos/{id}/transcript", get(get_transcript))
        .route("/videos/{id}/playback", get(get_playback))
        .route("/videos/{id}/progress", put(put_progress))
        .with_state(service)
}

/// Admin routes. The caller is responsible for the admin gate.
pub fn admin_router<R: CurriculumRepository + 'static>(
    service: Arc<CurriculumService<R>>,
) -> Router {
    Router::new()
        .route("/stats", get(get_admin_stats))
        .with_state(service)
}

/// Curriculum map with completion marks
#[utoipa::path(
    get,
    path = "/logbook",
    tag = TAG,
    responses(
        (status = 200, description = "Logbook", body = Logbook),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_logbook<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> CurriculumResult<Json<Logbook>> {
    let logbook = service.logbook(user.map(|u| u.id)).await?;
    Ok(Json(logbook))
}

/// Entry video of the curriculum
#[utoipa::path(
    get,
    path = "/opener",
    tag = TAG,
    responses(
        (status = 200, description = "Opener video", body = VideoSummary),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_opener<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
) -> CurriculumResult<Json<VideoSummary>> {
    Ok(Json(service.opener().await?))
}

/// Video summary
#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video found", body = VideoSummary),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_video<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
    UuidPath(id): UuidPath,
) -> CurriculumResult<Json<VideoSummary>> {
    Ok(Json(service.video(id).await?))
}

/// Transcript text, or a placeholder when none was uploaded
#[utoipa::path(
    get,
    path = "/videos/{id}/transcript",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Transcript", body = Transcript),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_transcript<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
    UuidPath(id): UuidPath,
) -> CurriculumResult<Json<Transcript>> {
    Ok(Json(service.transcript(id).await?))
}

/// Signed playback URL, gated on sign-in and entitlement.
///
/// Always 200; denial is reported in the envelope.
#[utoipa::path(
    get,
    path = "/videos/{id}/playback",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Playback envelope", body = PlaybackResponse),
        (status = 400, response = BadRequestUuidResponse)
    )
)]
async fn get_playback<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
    MaybeAuthUser(user): MaybeAuthUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Json<PlaybackResponse> {
    let user_id = user.map(|u| u.id);
    let response = service.authorized_video_url(user_id, id).await;

    if !response.success {
        AuditEvent::new(
            user_id,
            "video.playback",
            Some(format!("video:{}", id)),
            AuditOutcome::Denied,
        )
        .with_request_headers(&headers)
        .with_details(json!({ "reason": response.message }))
        .log();
    }

    Json(response)
}

/// Save player position
#[utoipa::path(
    put,
    path = "/videos/{id}/progress",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Video ID")),
    request_body = ProgressUpdate,
    responses(
        (status = 200, description = "Progress saved", body = WatchProgress),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn put_progress<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(update): ValidatedJson<ProgressUpdate>,
) -> CurriculumResult<Json<WatchProgress>> {
    let progress = service.record_progress(user.id, id, update).await?;
    Ok(Json(progress))
}

/// Content counts and the latest telemetry
#[utoipa::path(
    get,
    path = "/stats",
    tag = ADMIN_TAG,
    responses(
        (status = 200, description = "Dashboard stats", body = AdminStats),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_admin_stats<R: CurriculumRepository>(
    State(service): State<Arc<CurriculumService<R>>>,
) -> CurriculumResult<Json<AdminStats>> {
    Ok(Json(service.admin_stats().await?))
}
