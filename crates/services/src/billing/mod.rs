//! Subscription billing: hosted checkout, webhook intake and the study-route
//! entitlement check.

mod checkout;
mod config;
mod entitlement;
mod gate;
mod webhook;

pub use checkout::{
    CheckoutProvider, CheckoutRedirect, CheckoutSessionStatus, StripeCheckout, checkout_paid,
};
pub use config::BillingConfig;
pub use entitlement::EntitlementService;
pub use gate::{
    AccessDecision, ENTITLEMENT_COOKIE, EntitlementGate, SUBSCRIBE_REDIRECT, StudyGuard,
    SubscriptionGate,
};
pub use webhook::{
    SIGNATURE_TOLERANCE_SECS, WebhookEvent, WebhookOutcome, WebhookService, parse_event,
    signature_header, verify_signature,
};
