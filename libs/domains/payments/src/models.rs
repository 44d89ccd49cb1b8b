use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Status written for a settled checkout.
pub const PAYMENT_STATUS_COMPLETE: &str = "complete";

/// Metadata key carrying the purchasing user's id.
pub const USER_ID_METADATA_KEY: &str = "userId";

/// A recorded purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_session_id: String,
    pub stripe_customer_id: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Payment row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub stripe_session_id: String,
    pub stripe_customer_id: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub status: String,
}

impl NewPayment {
    pub fn into_payment(self) -> Payment {
        Payment {
            id: Uuid::now_v7(),
            user_id: self.user_id,
            stripe_session_id: self.stripe_session_id,
            stripe_customer_id: self.stripe_customer_id,
            amount_total: self.amount_total,
            currency: self.currency,
            status: self.status,
            created_at: Utc::now(),
        }
    }
}

/// `{success, url?, session_id?, message?}` envelope for checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckoutResponse {
    pub fn redirect(url: String, session_id: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            session_id: Some(session_id),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            session_id: None,
            message: Some(message.into()),
        }
    }
}

/// Acknowledgement returned to Stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

/// Everything needed to open a hosted checkout page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Redirect URLs rooted at `origin`. Stripe fills in `{CHECKOUT_SESSION_ID}`.
    pub fn for_origin(user_id: Uuid, customer_email: Option<String>, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            user_id,
            customer_email,
            success_url: format!(
                "{}/dashboard?session_id={{CHECKOUT_SESSION_ID}}&payment=success",
                origin
            ),
            cancel_url: format!("{}/?payment=cancelled", origin),
        }
    }
}

/// The subset of a Stripe Checkout Session the service reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Customer id, or the expanded customer object
    #[serde(default)]
    pub customer: Option<Value>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<Value>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn user_id(&self) -> Option<&str> {
        self.metadata
            .get(USER_ID_METADATA_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn customer_id(&self) -> Option<String> {
        expandable_id(self.customer.as_ref())
    }
}

/// The subset of a Stripe Charge the service reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<Value>,
}

impl Charge {
    pub fn payment_intent_id(&self) -> Option<String> {
        expandable_id(self.payment_intent.as_ref())
    }
}

/// Webhook event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl EventData {
    /// Id of the object the event refers to.
    pub fn object_id(&self) -> Option<&str> {
        self.object.get("id").and_then(Value::as_str)
    }

    /// Snapshot payloads embed the whole object; thin payloads only carry its id.
    pub fn is_snapshot(&self) -> bool {
        self.object
            .as_object()
            .is_some_and(|fields| fields.keys().any(|k| k != "id" && k != "object"))
    }
}

/// Stripe fields that are either an id string or an expanded object.
fn expandable_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) => Some(id.clone()),
        Value::Object(fields) => fields.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkout_urls() {
        let request = CheckoutRequest::for_origin(Uuid::nil(), None, "https://academy.test/");
        assert_eq!(
            request.success_url,
            "https://academy.test/dashboard?session_id={CHECKOUT_SESSION_ID}&payment=success"
        );
        assert_eq!(request.cancel_url, "https://academy.test/?payment=cancelled");
    }

    #[test]
    fn test_session_fields() {
        let session: CheckoutSession = serde_json::from_value(json!({
            "id": "cs_test_1",
            "customer": {"id": "cus_9", "object": "customer"},
            "amount_total": 10000,
            "currency": "usd",
            "metadata": {"userId": "0190f2c4-0000-7000-8000-000000000001"}
        }))
        .unwrap();
        assert_eq!(session.customer_id().as_deref(), Some("cus_9"));
        assert_eq!(
            session.user_id(),
            Some("0190f2c4-0000-7000-8000-000000000001")
        );

        let bare: CheckoutSession =
            serde_json::from_value(json!({"id": "cs_test_2", "metadata": {"userId": ""}})).unwrap();
        assert_eq!(bare.user_id(), None);
        assert_eq!(bare.customer_id(), None);
    }

    #[test]
    fn test_snapshot_detection() {
        let snapshot = EventData {
            object: json!({"id": "cs_1", "object": "checkout.session", "metadata": {}}),
        };
        let thin = EventData {
            object: json!({"id": "cs_1", "object": "checkout.session"}),
        };
        assert!(snapshot.is_snapshot());
        assert!(!thin.is_snapshot());
        assert_eq!(thin.object_id(), Some("cs_1"));
    }

    #[test]
    fn test_checkout_envelope_skips_empty_fields() {
        let value = serde_json::to_value(CheckoutResponse::failed("nope")).unwrap();
        assert_eq!(value, json!({"success": false, "message": "nope"}));
    }
}
