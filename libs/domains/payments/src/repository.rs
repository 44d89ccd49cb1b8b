use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::PaymentResult;
use crate::models::{NewPayment, Payment};

/// Repository trait for payment records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert unless a row with the same `stripe_session_id` exists.
    /// Returns whether a row was written.
    async fn insert(&self, payment: NewPayment) -> PaymentResult<bool>;

    async fn find_by_session_id(&self, session_id: &str) -> PaymentResult<Option<Payment>>;
}

/// In-memory implementation for tests and local development
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Payment> {
        self.payments.read().await.clone()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: NewPayment) -> PaymentResult<bool> {
        let mut payments = self.payments.write().await;
        if payments
            .iter()
            .any(|p| p.stripe_session_id == payment.stripe_session_id)
        {
            return Ok(false);
        }
        payments.push(payment.into_payment());
        Ok(true)
    }

    async fn find_by_session_id(&self, session_id: &str) -> PaymentResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .find(|p| p.stripe_session_id == session_id)
            .cloned())
    }
}
