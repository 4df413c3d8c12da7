//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::SubscriptionError;
use storage::repository::StorageError;

/// Errors emitted by the session runner for operations that do not fit the
/// current mode or phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("an exam is in progress; practice questions are unavailable")]
    ExamInProgress,
    #[error("the current question has not been graded")]
    NotGraded,
    #[error("exam already completed")]
    Completed,
}

/// Errors emitted while starting or verifying a subscription purchase.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    #[error("billing is not configured")]
    Disabled,
    #[error("missing checkout session id")]
    MissingSessionId,
    #[error("invalid checkout session id: {0}")]
    InvalidSessionId(String),
    #[error("checkout provider returned no redirect url")]
    MissingRedirect,
    #[error("checkout not complete (status {status}, payment {payment_status})")]
    CheckoutIncomplete {
        status: String,
        payment_status: String,
    },
    #[error("checkout request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while authenticating or applying a provider webhook.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebhookError {
    #[error("webhook secret is not configured")]
    NotConfigured,
    #[error("missing signature header")]
    MissingSignature,
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,
    #[error(transparent)]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
