use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, MaybeAuthUser, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::{AdventureError, AdventureResult};
use crate::models::{
    ActionResponse, Crossroads, PathVideo, Recommendation, RecommendationQuery,
    RecommendationsResponse,
};
use crate::repository::AdventureRepository;
use crate::service::AdventureService;

pub const TAG: &str = "adventure";
pub const ADMIN_TAG: &str = "admin";

/// OpenAPI documentation for the adventure API
#[derive(OpenApi)]
#[openapi(
    paths(get_recommendations, get_random_path, get_crossroads),
    components(
        schemas(Recommendation, RecommendationsResponse, PathVideo, Crossroads),
        responses(BadRequestUuidResponse, BadRequestValidationResponse)
    ),
    tags(
        (name = TAG, description = "Semantic and random next-video paths")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the embedding pipeline
#[derive(OpenApi)]
#[openapi(
    paths(post_video_embedding, post_bulk_embeddings),
    components(
        schemas(ActionResponse),
        responses(BadRequestUuidResponse, UnauthorizedResponse, ForbiddenResponse)
    ),
    tags(
        (name = ADMIN_TAG, description = "Admin dashboard")
    )
)]
pub struct AdminApiDoc;

/// Public path-selection routes; auth is optional.
pub fn router<R: AdventureRepository + 'static>(service: Arc<AdventureService<R>>) -> Router {
    Router::new()
        .route("/videos/{id}/recommendations", get(get_recommendations))
        .route("/videos/{id}/random", get(get_random_path))
        .route("/videos/{id}/crossroads", get(get_crossroads))
        .with_state(service)
}

/// Embedding pipeline triggers. The caller is responsible for the admin gate.
pub fn admin_router<R: AdventureRepository + 'static>(
    service: Arc<AdventureService<R>>,
) -> Router {
    Router::new()
        .route("/videos/{id}/embedding", post(post_video_embedding))
        .route("/embeddings/bulk", post(post_bulk_embeddings))
        .with_state(service)
}

/// Videos closest in meaning to this one
#[utoipa::path(
    get,
    path = "/videos/{id}/recommendations",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Current video ID"), RecommendationQuery),
    responses(
        (status = 200, description = "Recommendation envelope", body = RecommendationsResponse),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn get_recommendations<R: AdventureRepository>(
    State(service): State<Arc<AdventureService<R>>>,
    MaybeAuthUser(user): MaybeAuthUser,
    UuidPath(id): UuidPath,
    Query(query): Query<RecommendationQuery>,
) -> AdventureResult<Json<RecommendationsResponse>> {
    query
        .validate()
        .map_err(|e| AdventureError::Validation(e.to_string()))?;

    Ok(Json(
        service
            .semantic_recommendations(user.map(|u| u.id), id, query.limit)
            .await,
    ))
}

/// A random published video, the "unknown path"
#[utoipa::path(
    get,
    path = "/videos/{id}/random",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Current video ID")),
    responses(
        (status = 200, description = "Random video, or null when there is none", body = PathVideo),
        (status = 400, response = BadRequestUuidResponse)
    )
)]
async fn get_random_path<R: AdventureRepository>(
    State(service): State<Arc<AdventureService<R>>>,
    UuidPath(id): UuidPath,
) -> Json<Option<PathVideo>> {
    Json(service.random_path(id).await)
}

/// Both paths offered when a video ends
#[utoipa::path(
    get,
    path = "/videos/{id}/crossroads",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Current video ID")),
    responses(
        (status = 200, description = "Semantic and random choices", body = Crossroads),
        (status = 400, response = BadRequestUuidResponse)
    )
)]
async fn get_crossroads<R: AdventureRepository>(
    State(service): State<Arc<AdventureService<R>>>,
    MaybeAuthUser(user): MaybeAuthUser,
    UuidPath(id): UuidPath,
) -> Json<Crossroads> {
    Json(service.crossroads(user.map(|u| u.id), id).await)
}

/// Generate and store one video's embedding
#[utoipa::path(
    post,
    path = "/videos/{id}/embedding",
    tag = ADMIN_TAG,
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Pipeline result", body = ActionResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn post_video_embedding<R: AdventureRepository>(
    State(service): State<Arc<AdventureService<R>>>,
    user: AuthUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Json<ActionResponse> {
    let response = service.process_video_embedding(id).await;
    audit(&user, &headers, "embedding.generate", Some(format!("video:{}", id)), &response);
    Json(response)
}

/// Embed every published video that is still missing one
#[utoipa::path(
    post,
    path = "/embeddings/bulk",
    tag = ADMIN_TAG,
    responses(
        (status = 200, description = "Bulk run result", body = ActionResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn post_bulk_embeddings<R: AdventureRepository>(
    State(service): State<Arc<AdventureService<R>>>,
    user: AuthUser,
    headers: HeaderMap,
) -> Json<ActionResponse> {
    let response = service.bulk_process_embeddings().await;
    audit(&user, &headers, "embedding.bulk", None, &response);
    Json(response)
}

fn audit(
    user: &AuthUser,
    headers: &HeaderMap,
    action: &str,
    resource: Option<String>,
    response: &ActionResponse,
) {
    let outcome = if response.success {
        AuditOutcome::Success
    } else {
        AuditOutcome::Failure
    };
    AuditEvent::new(Some(user.id), action, resource, outcome)
        .with_request_headers(headers)
        .with_details(serde_json::json!({ "message": response.message }))
        .log();
}
