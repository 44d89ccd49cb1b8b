//! Handler tests for the adventure domain.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::JwtClaims;
use domain_activity::{ActivityRepository, ActivityService, EventType, InMemoryActivityRepository};
use domain_adventure::*;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

/// Embeds every document as the same unit vector.
struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> AdventureResult<Vec<f32>> {
        Ok(unit_vector())
    }
}

fn unit_vector() -> Vec<f32> {
    let mut v = vec![0.0; EMBEDDING_DIMENSION];
    v[0] = 1.0;
    v
}

fn claims(user_id: Uuid) -> JwtClaims {
    JwtClaims {
        sub: user_id,
        email: None,
        role: Some("authenticated".into()),
        aud: "authenticated".into(),
        exp: chrono::Utc::now().timestamp() + 600,
        iat: None,
        session_id: None,
    }
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

struct Fixture {
    app: Router,
    admin: Router,
    activity: InMemoryActivityRepository,
    current: StoredVideo,
    similar: StoredVideo,
    unindexed: StoredVideo,
}

async fn fixture() -> Fixture {
    let repo = InMemoryAdventureRepository::new();
    let activity = InMemoryActivityRepository::new();
    let service = Arc::new(
        AdventureService::new(
            repo.clone(),
            Arc::new(FixedEmbedder),
            Arc::new(ActivityService::new(activity.clone())),
        )
        .with_bulk_delay(Duration::ZERO),
    );

    let mut current = StoredVideo::new("Hip hinge");
    current.embedding = Some(unit_vector());
    let mut similar = StoredVideo::new("Romanian deadlift");
    similar.embedding = Some(unit_vector());
    let mut unindexed = StoredVideo::new("Breathing");
    unindexed.transcript_text = Some("Brace before the lift.".into());

    for v in [&current, &similar, &unindexed] {
        repo.add_video(v.clone()).await;
    }

    Fixture {
        app: handlers::router(service.clone()),
        admin: handlers::admin_router(service),
        activity,
        current,
        similar,
        unindexed,
    }
}

#[tokio::test]
async fn test_recommendations_for_anonymous_caller() {
    let f = fixture().await;
    let response = f
        .app
        .oneshot(
            Request::get(format!("/videos/{}/recommendations", f.current.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["id"], f.similar.id.to_string());
    assert!(body.get("message").is_none());
    assert!(f.activity.recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendations_for_signed_in_caller_are_logged() {
    let f = fixture().await;
    let user_id = Uuid::now_v7();
    let response = f
        .app
        .oneshot(
            Request::get(format!("/videos/{}/recommendations?limit=5", f.current.id))
                .extension(claims(user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let logs = f.activity.recent(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].event_type, EventType::AiRecommendationGenerated);
    assert_eq!(logs[0].user_id, Some(user_id));
}

#[tokio::test]
async fn test_recommendations_without_embedding() {
    let f = fixture().await;
    let response = f
        .app
        .oneshot(
            Request::get(format!("/videos/{}/recommendations", f.unindexed.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No embedding found for current video.");
}

#[tokio::test]
async fn test_recommendations_reject_out_of_range_limit() {
    let f = fixture().await;
    let response = f
        .app
        .oneshot(
            Request::get(format!("/videos/{}/recommendations?limit=0", f.current.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_random_path_never_returns_current() {
    let f = fixture().await;
    for _ in 0..5 {
        let response = f
            .app
            .clone()
            .oneshot(
                Request::get(format!("/videos/{}/random", f.current.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response.into_body()).await;
        assert_ne!(body["id"], f.current.id.to_string());
    }
}

#[tokio::test]
async fn test_crossroads_shape() {
    let f = fixture().await;
    let response = f
        .app
        .oneshot(
            Request::get(format!("/videos/{}/crossroads", f.current.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["semantic"]["success"], true);
    assert!(body["random"]["id"].is_string());
}

#[tokio::test]
async fn test_invalid_video_id_is_bad_request() {
    let f = fixture().await;
    let response = f
        .app
        .oneshot(
            Request::get("/videos/not-a-uuid/crossroads")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_embedding_requires_user() {
    let f = fixture().await;
    let response = f
        .admin
        .oneshot(
            Request::post(format!("/videos/{}/embedding", f.unindexed.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_embedding_then_bulk() {
    let f = fixture().await;
    let admin_id = Uuid::now_v7();

    let response = f
        .admin
        .clone()
        .oneshot(
            Request::post(format!("/videos/{}/embedding", f.unindexed.id))
                .extension(claims(admin_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully generated embedding for: Breathing");

    let response = f
        .admin
        .oneshot(
            Request::post("/embeddings/bulk")
                .extension(claims(admin_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "All videos indexed.");
}
