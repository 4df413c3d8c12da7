use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubscriptionError {
    #[error("subscription token cannot be empty")]
    EmptyToken,

    #[error("unknown subscription status: {0}")]
    UnknownStatus(String),

    #[error("updated_at is before created_at")]
    InvalidTimeRange,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Billing state as reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
}

impl SubscriptionStatus {
    /// Only paying (or trialing) subscribers may open gated content.
    #[must_use]
    pub fn is_entitled(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Ok(SubscriptionStatus::IncompleteExpired),
            "paused" => Ok(SubscriptionStatus::Paused),
            other => Err(SubscriptionError::UnknownStatus(other.to_string())),
        }
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Server-side record backing a visitor's entitlement cookie.
///
/// `token` is the checkout session id handed back to the browser after a
/// verified purchase; provider webhooks later update the status through
/// `subscription_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    token: String,
    customer_id: Option<String>,
    subscription_id: Option<String>,
    status: SubscriptionStatus,
    cancel_at_period_end: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Create a record for a freshly verified checkout.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError::EmptyToken` if the token is blank.
    pub fn new(
        token: impl Into<String>,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SubscriptionError::EmptyToken);
        }
        Ok(Self {
            token,
            customer_id: None,
            subscription_id: None,
            status,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a record from storage.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError` if the token is blank or timestamps are reversed.
    pub fn from_persisted(
        token: String,
        customer_id: Option<String>,
        subscription_id: Option<String>,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        if updated_at < created_at {
            return Err(SubscriptionError::InvalidTimeRange);
        }
        let mut record = Self::new(token, status, created_at)?;
        record.customer_id = customer_id;
        record.subscription_id = subscription_id;
        record.cancel_at_period_end = cancel_at_period_end;
        record.updated_at = updated_at;
        Ok(record)
    }

    #[must_use]
    pub fn with_customer(mut self, customer_id: Option<String>) -> Self {
        self.customer_id = customer_id;
        self
    }

    #[must_use]
    pub fn with_subscription(mut self, subscription_id: Option<String>) -> Self {
        self.subscription_id = subscription_id;
        self
    }

    /// Apply a provider status change.
    pub fn apply_status(
        &mut self,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        at: DateTime<Utc>,
    ) {
        self.status = status;
        self.cancel_at_period_end = cancel_at_period_end;
        self.updated_at = at.max(self.created_at);
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    #[must_use]
    pub fn cancel_at_period_end(&self) -> bool {
        self.cancel_at_period_end
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_entitled(&self) -> bool {
        self.status.is_entitled()
    }
}
