use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_helpers::{AuditEvent, AuditOutcome, MaybeAuthUser};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PaymentError;
use crate::models::{CheckoutResponse, WebhookAck};
use crate::repository::PaymentRepository;
use crate::service::{Buyer, PaymentService, WebhookOutcome};

pub const TAG: &str = "payments";
pub const WEBHOOK_TAG: &str = "webhooks";

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// OpenAPI documentation for payments
#[derive(OpenApi)]
#[openapi(
    paths(create_checkout, stripe_webhook),
    components(schemas(CheckoutResponse, WebhookAck)),
    tags(
        (name = TAG, description = "Academy access checkout"),
        (name = WEBHOOK_TAG, description = "Payment provider callbacks")
    )
)]
pub struct ApiDoc;

/// Checkout routes. The caller layers optional auth in front.
pub fn router<R: PaymentRepository + 'static>(service: Arc<PaymentService<R>>) -> Router {
    Router::new()
        .route("/checkout", post(create_checkout))
        .with_state(service)
}

/// Stripe webhook route; authenticated by signature, not by user.
pub fn webhook_router<R: PaymentRepository + 'static>(service: Arc<PaymentService<R>>) -> Router {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(service)
}

/// Start a hosted checkout for the signed-in user
#[utoipa::path(
    post,
    path = "/checkout",
    tag = TAG,
    responses(
        (status = 200, description = "Checkout envelope with the redirect URL, or why it failed", body = CheckoutResponse)
    )
)]
async fn create_checkout<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    MaybeAuthUser(user): MaybeAuthUser,
    headers: HeaderMap,
) -> Json<CheckoutResponse> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    let user_id = user.as_ref().map(|u| u.id);
    let buyer = user.map(|u| Buyer {
        id: u.id,
        email: u.email,
    });

    let response = service.create_checkout_session(buyer, origin).await;

    let outcome = match (&user_id, response.success) {
        (None, _) => AuditOutcome::Denied,
        (Some(_), true) => AuditOutcome::Success,
        (Some(_), false) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        user_id,
        "checkout.create",
        response.session_id.as_ref().map(|id| format!("checkout_session:{}", id)),
        outcome,
    )
    .with_request_headers(&headers)
    .log();

    Json(response)
}

/// Receive a signed Stripe event
#[utoipa::path(
    post,
    path = "/stripe",
    tag = WEBHOOK_TAG,
    request_body(content = String, description = "Raw event JSON, verified against the Stripe-Signature header"),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Signature verification failed or metadata missing", body = String),
        (status = 500, description = "Event could not be applied", body = String)
    )
)]
async fn stripe_webhook<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match service.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            audit_outcome(&outcome, &headers);
            Json(WebhookAck { received: true }).into_response()
        }
        Err(err) => {
            let outcome = match err {
                PaymentError::Signature(_) => AuditOutcome::Denied,
                _ => AuditOutcome::Failure,
            };
            AuditEvent::new(None, "webhook.stripe", None, outcome)
                .with_request_headers(&headers)
                .with_details(json!({ "error": err.to_string() }))
                .log();
            webhook_error_response(err)
        }
    }
}

/// Plain-text responses Stripe shows in the dashboard delivery log.
fn webhook_error_response(err: PaymentError) -> Response {
    match err {
        PaymentError::Signature(msg) | PaymentError::Payload(msg) => {
            tracing::error!("Webhook rejected: {}", msg);
            (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", msg)).into_response()
        }
        PaymentError::MissingMetadata => {
            (StatusCode::BAD_REQUEST, "Missing metadata").into_response()
        }
        PaymentError::Gateway(_) | PaymentError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn audit_outcome(outcome: &WebhookOutcome, headers: &HeaderMap) {
    let (user_id, action, resource) = match outcome {
        WebhookOutcome::PaymentRecorded {
            user_id,
            session_id,
        } => (
            Some(*user_id),
            "payment.record",
            Some(format!("checkout_session:{}", session_id)),
        ),
        WebhookOutcome::AccessRevoked { user_id } => {
            (Some(*user_id), "payment.refund", None)
        }
        _ => return,
    };
    AuditEvent::new(user_id, action, resource, AuditOutcome::Success)
        .with_request_headers(headers)
        .log();
}
