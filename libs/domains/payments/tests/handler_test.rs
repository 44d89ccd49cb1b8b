//! Handler tests for checkout and the Stripe webhook.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::JwtClaims;
use domain_payments::models::{Charge, CheckoutRequest, CheckoutSession};
use domain_payments::webhook::sign_payload;
use domain_payments::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "whsec_handler_test";

/// Gateway that opens sessions at a fixed URL and knows one payment intent.
struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> PaymentResult<CheckoutSession> {
        Ok(CheckoutSession {
            id: "cs_test_1".into(),
            url: Some(format!("https://checkout.stripe.test/{}", request.user_id)),
            ..Default::default()
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession> {
        Err(PaymentError::Gateway(format!("No such session: {}", session_id)))
    }

    async fn retrieve_charge(&self, charge_id: &str) -> PaymentResult<Charge> {
        Err(PaymentError::Gateway(format!("No such charge: {}", charge_id)))
    }

    async fn find_session_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> PaymentResult<Option<CheckoutSession>> {
        Ok((payment_intent == "pi_1").then(|| CheckoutSession {
            id: "cs_test_1".into(),
            ..Default::default()
        }))
    }

    async fn balance(&self) -> PaymentResult<Value> {
        Ok(json!({"object": "balance"}))
    }

    async fn list_products(&self, _limit: u32) -> PaymentResult<Value> {
        Ok(json!({"object": "list", "data": []}))
    }
}

#[derive(Default)]
struct RecordingAccess {
    changes: Mutex<Vec<(Uuid, bool)>>,
}

#[async_trait]
impl PaidAccess for RecordingAccess {
    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> PaymentResult<bool> {
        self.changes.lock().unwrap().push((user_id, is_paid));
        Ok(true)
    }
}

struct Fixture {
    checkout: Router,
    webhooks: Router,
    repo: InMemoryPaymentRepository,
    access: Arc<RecordingAccess>,
}

fn fixture() -> Fixture {
    let repo = InMemoryPaymentRepository::new();
    let access = Arc::new(RecordingAccess::default());
    let service = Arc::new(PaymentService::new(
        repo.clone(),
        Arc::new(FakeGateway),
        access.clone(),
        &StripeConfig::new("sk_test_123", SECRET),
        "https://academy.test",
    ));
    Fixture {
        checkout: handlers::router(service.clone()),
        webhooks: handlers::webhook_router(service),
        repo,
        access,
    }
}

fn claims(user_id: Uuid) -> JwtClaims {
    JwtClaims {
        sub: user_id,
        email: Some("athlete@example.com".into()),
        role: Some("authenticated".into()),
        aud: "authenticated".into(),
        exp: chrono::Utc::now().timestamp() + 600,
        iat: None,
        session_id: None,
    }
}

async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn webhook_request(event: &Value, secret: &str) -> Request<Body> {
    let payload = serde_json::to_vec(event).unwrap();
    let header = sign_payload(&payload, secret, chrono::Utc::now().timestamp()).unwrap();
    Request::post("/stripe")
        .header("stripe-signature", header)
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap()
}

fn completed_event(user_id: Option<Uuid>) -> Value {
    let metadata = user_id
        .map(|id| json!({"userId": id.to_string()}))
        .unwrap_or_else(|| json!({}));
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {"object": {
            "id": "cs_test_1",
            "object": "checkout.session",
            "customer": "cus_1",
            "amount_total": 10000,
            "currency": "usd",
            "metadata": metadata
        }}
    })
}

#[tokio::test]
async fn test_anonymous_checkout_asks_to_sign_in() {
    let f = fixture();
    let response = f
        .checkout
        .oneshot(Request::post("/checkout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Please sign in to purchase the Academy access."})
    );
}

#[tokio::test]
async fn test_signed_in_checkout_returns_redirect() {
    let f = fixture();
    let user_id = Uuid::now_v7();
    let response = f
        .checkout
        .oneshot(
            Request::post("/checkout")
                .header("origin", "https://academy.test")
                .extension(claims(user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["session_id"], "cs_test_1");
    assert_eq!(
        body["url"],
        format!("https://checkout.stripe.test/{}", user_id)
    );
}

#[tokio::test]
async fn test_webhook_with_bad_signature() {
    let f = fixture();
    let response = f
        .webhooks
        .oneshot(webhook_request(&completed_event(Some(Uuid::now_v7())), "whsec_wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response.into_body()).await.starts_with("Webhook Error: "));
    assert!(f.repo.all().await.is_empty());
}

#[tokio::test]
async fn test_webhook_without_signature_header() {
    let f = fixture();
    let response = f
        .webhooks
        .oneshot(
            Request::post("/stripe")
                .body(Body::from(completed_event(None).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_records_payment() {
    let f = fixture();
    let user_id = Uuid::now_v7();
    let response = f
        .webhooks
        .oneshot(webhook_request(&completed_event(Some(user_id)), SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body_text(response.into_body()).await).unwrap(),
        json!({"received": true})
    );
    let payments = f.repo.all().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].user_id, user_id);
}

#[tokio::test]
async fn test_webhook_missing_metadata() {
    let f = fixture();
    let response = f
        .webhooks
        .oneshot(webhook_request(&completed_event(None), SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response.into_body()).await, "Missing metadata");
}

#[tokio::test]
async fn test_refund_revokes_access() {
    let f = fixture();
    let user_id = Uuid::now_v7();
    f.webhooks
        .clone()
        .oneshot(webhook_request(&completed_event(Some(user_id)), SECRET))
        .await
        .unwrap();

    let refund = json!({
        "id": "evt_2",
        "type": "charge.refunded",
        "data": {"object": {"id": "ch_1", "object": "charge", "payment_intent": "pi_1"}}
    });
    let response = f
        .webhooks
        .oneshot(webhook_request(&refund, SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*f.access.changes.lock().unwrap(), vec![(user_id, false)]);
}

#[tokio::test]
async fn test_thin_payload_lookup_failure_is_server_error() {
    let f = fixture();
    let thin = json!({
        "id": "evt_3",
        "type": "checkout.session.completed",
        "data": {"object": {"id": "cs_missing"}}
    });
    let response = f
        .webhooks
        .oneshot(webhook_request(&thin, SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response.into_body()).await, "Internal Server Error");
}
