use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, warn};

use exam_core::Clock;
use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
use storage::repository::SubscriptionRepository;

use super::checkout::checkout_paid;
use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Largest accepted gap between the signed timestamp and now, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

//
// ─── SIGNATURES ────────────────────────────────────────────────────────────────
//

/// Check a `t=<unix>,v1=<hex>[,v1=…]` signature header against `payload`.
///
/// # Errors
///
/// `MalformedSignature` when the header lacks a timestamp or `v1` entry,
/// `SignatureMismatch` when no `v1` entry matches, `StaleTimestamp` when the
/// signed time is further than `tolerance` from `now`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedSignature)?,
                );
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
    if candidates.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }

    let matched = candidates.into_iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        signed_mac(payload, secret, timestamp)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    if (now.timestamp() - timestamp).abs() > tolerance.num_seconds() {
        return Err(WebhookError::StaleTimestamp);
    }
    Ok(())
}

/// Build the header a provider would send for `payload` signed at `timestamp`.
///
/// # Errors
///
/// Returns `WebhookError::NotConfigured` if the secret cannot key the MAC.
pub fn signature_header(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, WebhookError> {
    let mac = signed_mac(payload, secret, timestamp)?;
    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn signed_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::NotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Provider events this app acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A checkout finished, or its delayed payment settled. `paid` follows
    /// the same rule as a verified checkout.
    CheckoutCompleted {
        session_id: String,
        customer: Option<String>,
        subscription: Option<String>,
        paid: bool,
    },
    SubscriptionChanged {
        subscription_id: String,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
    },
    /// Any other event type; acknowledged without side effects.
    Ignored { kind: String },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct CompletedSession {
    id: String,
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    subscription: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
}

#[derive(Deserialize)]
struct SubscriptionObject {
    id: String,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
}

/// Decode an event body.
///
/// # Errors
///
/// Returns `WebhookError::Payload` for malformed JSON and
/// `WebhookError::Subscription` for an unknown subscription status.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let raw: RawEvent = serde_json::from_slice(payload)?;
    match raw.kind.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            let session: CompletedSession = serde_json::from_value(raw.data.object)?;
            Ok(WebhookEvent::CheckoutCompleted {
                paid: checkout_paid(session.status.as_deref(), session.payment_status.as_deref()),
                session_id: session.id,
                customer: session.customer,
                subscription: session.subscription,
            })
        }
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            let sub: SubscriptionObject = serde_json::from_value(raw.data.object)?;
            Ok(WebhookEvent::SubscriptionChanged {
                subscription_id: sub.id,
                status: sub.status.parse()?,
                cancel_at_period_end: sub.cancel_at_period_end,
            })
        }
        _ => Ok(WebhookEvent::Ignored { kind: raw.kind }),
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// What a handled webhook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Recorded { token: String },
    /// The token was already stored; its status is left alone.
    AlreadyRecorded { token: String },
    /// Completed without payment yet; nothing is granted.
    AwaitingPayment { session_id: String },
    Updated { subscription_id: String, records: u64 },
    Ignored { kind: String },
}

/// Authenticates provider webhooks and applies them to stored subscriptions.
#[derive(Clone)]
pub struct WebhookService {
    clock: Clock,
    secret: Option<String>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl WebhookService {
    #[must_use]
    pub fn new(
        clock: Clock,
        secret: Option<String>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            clock,
            secret,
            subscriptions,
        }
    }

    /// Verify and apply one webhook delivery.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError` when the signature header is missing or invalid,
    /// the secret is not configured, the body cannot be decoded, or storage
    /// fails.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let Some(signature) = signature.filter(|s| !s.trim().is_empty()) else {
            warn!("webhook rejected: missing signature header");
            return Err(WebhookError::MissingSignature);
        };
        let secret = self.secret.as_deref().ok_or(WebhookError::NotConfigured)?;
        let now = self.clock.now();

        if let Err(err) = verify_signature(
            payload,
            signature,
            secret,
            now,
            Duration::seconds(SIGNATURE_TOLERANCE_SECS),
        ) {
            warn!(error = %err, "webhook rejected");
            return Err(err);
        }

        match parse_event(payload)? {
            WebhookEvent::CheckoutCompleted {
                session_id,
                paid: false,
                ..
            } => {
                info!(%session_id, "checkout completed without payment");
                Ok(WebhookOutcome::AwaitingPayment { session_id })
            }
            WebhookEvent::CheckoutCompleted {
                session_id,
                customer,
                subscription,
                paid: true,
            } => {
                if let Some(existing) = self.subscriptions.get_by_token(&session_id).await? {
                    info!(token = %existing.token(), status = %existing.status(), "checkout already recorded");
                    return Ok(WebhookOutcome::AlreadyRecorded { token: session_id });
                }
                let record = SubscriptionRecord::new(session_id, SubscriptionStatus::Active, now)?
                    .with_customer(customer)
                    .with_subscription(subscription);
                self.subscriptions.upsert(&record).await?;
                info!(token = %record.token(), "subscription recorded from webhook");
                Ok(WebhookOutcome::Recorded {
                    token: record.token().to_string(),
                })
            }
            WebhookEvent::SubscriptionChanged {
                subscription_id,
                status,
                cancel_at_period_end,
            } => {
                let records = self
                    .subscriptions
                    .update_by_subscription(&subscription_id, status, cancel_at_period_end, now)
                    .await?;
                info!(%subscription_id, %status, records, "subscription status updated");
                Ok(WebhookOutcome::Updated {
                    subscription_id,
                    records,
                })
            }
            WebhookEvent::Ignored { kind } => {
                info!(%kind, "webhook event ignored");
                Ok(WebhookOutcome::Ignored { kind })
            }
        }
    }
}
