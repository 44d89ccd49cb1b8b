use async_trait::async_trait;
use domain_curriculum::{CurriculumRepository, CurriculumService};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::StripeConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::gateway::PaymentGateway;
use crate::models::{
    Charge, CheckoutRequest, CheckoutResponse, CheckoutSession, NewPayment,
    PAYMENT_STATUS_COMPLETE, StripeEvent,
};
use crate::repository::PaymentRepository;
use crate::webhook;

pub const SIGN_IN_REQUIRED: &str = "Please sign in to purchase the Academy access.";
pub const GATEWAY_UNAVAILABLE: &str =
    "Payment gateway is currently unavailable. Please try again later.";

/// Toggles a user's paid entitlement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaidAccess: Send + Sync {
    /// Returns false when no profile matched
    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> PaymentResult<bool>;
}

#[async_trait]
impl<R: CurriculumRepository> PaidAccess for CurriculumService<R> {
    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> PaymentResult<bool> {
        CurriculumService::set_paid(self, user_id, is_paid)
            .await
            .map_err(|e| PaymentError::Internal(e.to_string()))
    }
}

/// Signed-in buyer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    pub id: Uuid,
    pub email: Option<String>,
}

/// What a processed webhook event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    PaymentRecorded { user_id: Uuid, session_id: String },
    DuplicatePayment { session_id: String },
    AccessRevoked { user_id: Uuid },
    RefundUnmatched { payment_intent: Option<String> },
    Ignored { event_type: String },
}

/// Stripe checkout and webhook processing
pub struct PaymentService<R: PaymentRepository> {
    repository: Arc<R>,
    gateway: Arc<dyn PaymentGateway>,
    access: Arc<dyn PaidAccess>,
    webhook_secret: String,
    webhook_tolerance_secs: i64,
    app_base_url: String,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(
        repository: R,
        gateway: Arc<dyn PaymentGateway>,
        access: Arc<dyn PaidAccess>,
        config: &StripeConfig,
        app_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            gateway,
            access,
            webhook_secret: config.webhook_secret.clone(),
            webhook_tolerance_secs: config.webhook_tolerance_secs,
            app_base_url: app_base_url.into(),
        }
    }

    /// Open a hosted checkout page for `buyer`.
    ///
    /// Redirect URLs are rooted at `origin`, falling back to the app base URL.
    pub async fn create_checkout_session(
        &self,
        buyer: Option<Buyer>,
        origin: Option<&str>,
    ) -> CheckoutResponse {
        let Some(buyer) = buyer else {
            return CheckoutResponse::failed(SIGN_IN_REQUIRED);
        };

        let origin = origin
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(&self.app_base_url);
        let request = CheckoutRequest::for_origin(buyer.id, buyer.email, origin);

        match self.gateway.create_checkout_session(&request).await {
            Ok(CheckoutSession {
                id,
                url: Some(url),
                ..
            }) => {
                tracing::info!(user_id = %buyer.id, session_id = %id, "Checkout session created");
                CheckoutResponse::redirect(url, id)
            }
            Ok(session) => {
                tracing::error!(session_id = %session.id, "Checkout session has no URL");
                CheckoutResponse::failed(GATEWAY_UNAVAILABLE)
            }
            Err(e) => {
                tracing::error!(user_id = %buyer.id, error = %e, "Stripe session error");
                CheckoutResponse::failed(GATEWAY_UNAVAILABLE)
            }
        }
    }

    /// Verify and apply a webhook delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> PaymentResult<WebhookOutcome> {
        let signature = signature.ok_or_else(|| {
            PaymentError::Signature("No stripe-signature header value was provided.".into())
        })?;
        let event = webhook::construct_event(
            payload,
            signature,
            &self.webhook_secret,
            self.webhook_tolerance_secs,
            chrono::Utc::now().timestamp(),
        )?;

        self.dispatch(event).await
    }

    async fn dispatch(&self, event: StripeEvent) -> PaymentResult<WebhookOutcome> {
        match event.event_type.as_str() {
            "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
                self.record_payment(&event).await
            }
            "charge.refunded" => self.revoke_access(&event).await,
            other => {
                tracing::info!(event_id = %event.id, event_type = other, "Unhandled event type");
                Ok(WebhookOutcome::Ignored {
                    event_type: other.to_string(),
                })
            }
        }
    }

    async fn record_payment(&self, event: &StripeEvent) -> PaymentResult<WebhookOutcome> {
        let session: CheckoutSession = if event.data.is_snapshot() {
            serde_json::from_value(event.data.object.clone())
                .map_err(|e| PaymentError::Payload(e.to_string()))?
        } else {
            tracing::info!(event_id = %event.id, "Processing thin payload");
            let id = event
                .data
                .object_id()
                .ok_or_else(|| PaymentError::Payload("event object has no id".into()))?;
            self.gateway.retrieve_session(id).await?
        };

        let user_id = session
            .user_id()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                tracing::error!(session_id = %session.id, "No userId found in session metadata");
                PaymentError::MissingMetadata
            })?;

        let inserted = self
            .repository
            .insert(NewPayment {
                user_id,
                stripe_session_id: session.id.clone(),
                stripe_customer_id: session.customer_id(),
                amount_total: session.amount_total,
                currency: session.currency.clone(),
                status: PAYMENT_STATUS_COMPLETE.to_string(),
            })
            .await
            .inspect_err(|e| tracing::error!(session_id = %session.id, error = %e, "Payment sync error"))?;

        if inserted {
            tracing::info!(%user_id, session_id = %session.id, "Payment processed");
            Ok(WebhookOutcome::PaymentRecorded {
                user_id,
                session_id: session.id,
            })
        } else {
            tracing::info!(session_id = %session.id, "Payment already recorded");
            Ok(WebhookOutcome::DuplicatePayment {
                session_id: session.id,
            })
        }
    }

    async fn revoke_access(&self, event: &StripeEvent) -> PaymentResult<WebhookOutcome> {
        let charge: Charge = if event.data.is_snapshot() {
            serde_json::from_value(event.data.object.clone())
                .map_err(|e| PaymentError::Payload(e.to_string()))?
        } else {
            let id = event
                .data
                .object_id()
                .ok_or_else(|| PaymentError::Payload("event object has no id".into()))?;
            self.gateway.retrieve_charge(id).await?
        };

        let Some(payment_intent) = charge.payment_intent_id() else {
            tracing::warn!(charge_id = %charge.id, "Refunded charge has no payment intent");
            return Ok(WebhookOutcome::RefundUnmatched {
                payment_intent: None,
            });
        };

        let mut payment = None;
        match self
            .gateway
            .find_session_by_payment_intent(&payment_intent)
            .await
        {
            Ok(Some(session)) => {
                payment = self.repository.find_by_session_id(&session.id).await?;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%payment_intent, error = %e, "Session lookup for refund failed")
            }
        }
        if payment.is_none() {
            payment = self.repository.find_by_session_id(&payment_intent).await?;
        }

        let Some(payment) = payment else {
            tracing::warn!(%payment_intent, "No payment found for refunded charge");
            return Ok(WebhookOutcome::RefundUnmatched {
                payment_intent: Some(payment_intent),
            });
        };

        self.access.set_paid(payment.user_id, false).await?;
        tracing::info!(user_id = %payment.user_id, "Access revoked for refunded user");
        Ok(WebhookOutcome::AccessRevoked {
            user_id: payment.user_id,
        })
    }
}
