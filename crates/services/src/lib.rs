#![forbid(unsafe_code)]

pub mod billing;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;
pub use sessions as session;

pub use error::{BillingError, SessionError, WebhookError};

pub use billing::{
    AccessDecision, BillingConfig, CheckoutProvider, CheckoutRedirect, CheckoutSessionStatus,
    EntitlementGate, EntitlementService, StripeCheckout, StudyGuard, SubscriptionGate,
    WebhookOutcome, WebhookService,
};
pub use sessions::{ExamPlan, QuizSession, ScoreTally, SessionEvent, SessionSnapshot};
