//! Payments Domain
//!
//! Sells academy access through Stripe Checkout and applies Stripe's webhook
//! events to the `payments` table and the buyer's entitlement.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← POST /checkout, POST /stripe (webhook)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Signature check, event dispatch, refund revocation
//! └──┬───────┬──┘
//!    │       │
//!    │  ┌────▼───────────┐
//!    │  │ PaymentGateway │  ← Stripe REST (form-encoded)
//!    │  │ PaidAccess     │  ← profiles.is_paid via curriculum
//!    │  └────────────────┘
//! ┌──▼──────────┐
//! │ Repository  │  ← Postgres or in-memory
//! └─────────────┘
//! ```
//!
//! Inserting a payment row is what unlocks access: a trigger in the database
//! flips `profiles.is_paid`. Refunds are the only path that writes the flag
//! from here.

pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod webhook;

pub use config::{CheckoutProduct, StripeConfig};
pub use error::{PaymentError, PaymentResult};
pub use gateway::{PaymentGateway, StripeClient};
pub use models::{CheckoutResponse, Payment, WebhookAck};
pub use postgres::PgPaymentRepository;
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
pub use service::{Buyer, PaidAccess, PaymentService, WebhookOutcome};
