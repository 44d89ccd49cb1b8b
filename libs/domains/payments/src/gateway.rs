//! Stripe REST client.
//!
//! Requests are form-encoded with bracketed keys and authenticated with the
//! secret key as a bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{CheckoutProduct, StripeConfig};
use crate::error::{PaymentError, PaymentResult};
use crate::models::{Charge, CheckoutRequest, CheckoutSession, USER_ID_METADATA_KEY};

/// Hosted payment provider operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> PaymentResult<CheckoutSession>;

    /// Full session with line items expanded
    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession>;

    async fn retrieve_charge(&self, charge_id: &str) -> PaymentResult<Charge>;

    /// The checkout session that created `payment_intent`, if any
    async fn find_session_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> PaymentResult<Option<CheckoutSession>>;

    async fn balance(&self) -> PaymentResult<Value>;

    async fn list_products(&self, limit: u32) -> PaymentResult<Value>;
}

pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.config.secret_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway(format!(
                "Stripe API error ({}): {}",
                status,
                stripe_error_message(&body)
            )));
        }
        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct List<T> {
    data: Vec<T>,
}

/// Pull `error.message` out of a Stripe error body, or return it as is.
fn stripe_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Form fields for a one-item payment-mode checkout session.
pub fn checkout_form(request: &CheckoutRequest, product: &CheckoutProduct) -> Vec<(String, String)> {
    let item = "line_items[0]";
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (format!("{item}[quantity]"), "1".to_string()),
        (format!("{item}[price_data][currency]"), product.currency.clone()),
        (format!("{item}[price_data][unit_amount]"), product.unit_amount.to_string()),
        (format!("{item}[price_data][product_data][name]"), product.name.clone()),
        (
            format!("{item}[price_data][product_data][description]"),
            product.description.clone(),
        ),
        (
            format!("metadata[{}]", USER_ID_METADATA_KEY),
            request.user_id.to_string(),
        ),
    ];
    if let Some(image) = &product.image {
        form.push((format!("{item}[price_data][product_data][images][0]"), image.clone()));
    }
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> PaymentResult<CheckoutSession> {
        let form = checkout_form(request, &self.config.product);
        let session: CheckoutSession = self
            .send(
                self.client
                    .post(self.url("checkout/sessions"))
                    .bearer_auth(&self.config.secret_key)
                    .form(&form),
            )
            .await?;
        tracing::debug!(session_id = %session.id, user_id = %request.user_id, "Created checkout session");
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession> {
        self.send(
            self.get(&format!("checkout/sessions/{}", session_id))
                .query(&[("expand[]", "line_items")]),
        )
        .await
    }

    async fn retrieve_charge(&self, charge_id: &str) -> PaymentResult<Charge> {
        self.send(self.get(&format!("charges/{}", charge_id))).await
    }

    async fn find_session_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> PaymentResult<Option<CheckoutSession>> {
        let list: List<CheckoutSession> = self
            .send(
                self.get("checkout/sessions")
                    .query(&[("payment_intent", payment_intent), ("limit", "1")]),
            )
            .await?;
        Ok(list.data.into_iter().next())
    }

    async fn balance(&self) -> PaymentResult<Value> {
        self.send(self.get("balance")).await
    }

    async fn list_products(&self, limit: u32) -> PaymentResult<Value> {
        self.send(self.get("products").query(&[("limit", limit)]))
            .await
    }
}
