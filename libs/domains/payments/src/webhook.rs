//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header carries a `t=` timestamp and one or more
//! `v1=` signatures. Each signature is a hex HMAC-SHA256 of `"{t}.{body}"`
//! keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, PaymentResult};
use crate::models::StripeEvent;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_SCHEME: &str = "v1";

/// Verify `header` against `payload`, then parse the event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<StripeEvent> {
    verify_signature(payload, header, secret, tolerance_secs, now)?;
    serde_json::from_slice(payload).map_err(|e| PaymentError::Payload(e.to_string()))
}

pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<()> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some((SIGNATURE_SCHEME, value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::Signature("Unable to extract timestamp and signatures from header".into())
    })?;
    if signatures.is_empty() {
        return Err(PaymentError::Signature(
            "No signatures found with expected scheme".into(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|signature| {
        const_hex::decode(signature)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(PaymentError::Signature(
            "No signatures found matching the expected signature for payload".into(),
        ));
    }

    if tolerance_secs > 0 && timestamp < now - tolerance_secs {
        return Err(PaymentError::Signature(
            "Timestamp outside the tolerance zone".into(),
        ));
    }

    Ok(())
}

/// Header value Stripe would send for `payload` at `timestamp`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> PaymentResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = const_hex::encode(mac.finalize().into_bytes());
    Ok(format!("t={},{}={}", timestamp, SIGNATURE_SCHEME, signature))
}
