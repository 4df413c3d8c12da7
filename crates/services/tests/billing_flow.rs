use std::sync::Arc;

use async_trait::async_trait;
use exam_core::Clock;
use exam_core::model::SubscriptionStatus;
use exam_core::time::{FIXED_TEST_TIMESTAMP, fixed_now};
use services::billing::{
    AccessDecision, CheckoutProvider, CheckoutRedirect, CheckoutSessionStatus,
    EntitlementService, SUBSCRIBE_REDIRECT, StudyGuard, SubscriptionGate, WebhookOutcome,
    WebhookService, signature_header,
};
use services::{BillingError, WebhookError};
use storage::repository::{InMemoryRepository, SubscriptionRepository};

const SECRET: &str = "whsec_flow";

fn completed(session_id: &str) -> String {
    completed_with(session_id, "paid")
}

fn completed_with(session_id: &str, payment_status: &str) -> String {
    format!(
        r#"{{"id":"evt_1","type":"checkout.session.completed","data":{{"object":{{"id":"{session_id}","customer":"cus_1","subscription":"sub_1","status":"complete","payment_status":"{payment_status}"}}}}}}"#
    )
}

fn subscription_update(status: &str) -> String {
    format!(
        r#"{{"id":"evt_2","type":"customer.subscription.updated","data":{{"object":{{"id":"sub_1","status":"{status}","cancel_at_period_end":false}}}}}}"#
    )
}

fn signed(body: &str) -> String {
    signature_header(body.as_bytes(), SECRET, FIXED_TEST_TIMESTAMP).unwrap()
}

/// Provider whose checkouts all stay complete and paid.
struct PaidCheckout;

#[async_trait]
impl CheckoutProvider for PaidCheckout {
    async fn create_checkout(&self) -> Result<CheckoutRedirect, BillingError> {
        Err(BillingError::Disabled)
    }

    async fn retrieve_checkout(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, BillingError> {
        Ok(CheckoutSessionStatus {
            id: session_id.into(),
            status: Some("complete".into()),
            payment_status: Some("paid".into()),
            mode: Some("subscription".into()),
            customer: Some("cus_1".into()),
            subscription: Some("sub_1".into()),
        })
    }
}

fn webhooks(repo: &InMemoryRepository) -> WebhookService {
    WebhookService::new(
        Clock::fixed(fixed_now()),
        Some(SECRET.into()),
        Arc::new(repo.clone()),
    )
}

fn guard(repo: &InMemoryRepository) -> StudyGuard {
    StudyGuard::new(Arc::new(SubscriptionGate::new(Arc::new(repo.clone()))))
}

#[tokio::test]
async fn webhook_grants_then_revokes_study_access() {
    let repo = InMemoryRepository::new();
    let webhooks = WebhookService::new(
        Clock::fixed(fixed_now()),
        Some(SECRET.into()),
        Arc::new(repo.clone()),
    );
    let guard = StudyGuard::new(Arc::new(SubscriptionGate::new(Arc::new(repo.clone()))));

    assert_eq!(
        guard.check("/study", Some("cs_flow")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );

    let body = completed("cs_flow");
    let outcome = webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Recorded {
            token: "cs_flow".into()
        }
    );
    assert_eq!(
        guard.check("/study", Some("cs_flow")).await,
        AccessDecision::Allow
    );

    let body = subscription_update("canceled");
    let outcome = webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Updated {
            subscription_id: "sub_1".into(),
            records: 1
        }
    );
    let stored = repo.get_by_token("cs_flow").await.unwrap().unwrap();
    assert_eq!(stored.status(), SubscriptionStatus::Canceled);
    assert_eq!(
        guard.check("/study/exam", Some("cs_flow")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );
}

#[tokio::test]
async fn webhook_rejections_leave_storage_untouched() {
    let repo = InMemoryRepository::new();
    let body = completed("cs_reject");

    let unconfigured = WebhookService::new(Clock::fixed(fixed_now()), None, Arc::new(repo.clone()));
    assert!(matches!(
        unconfigured.handle(body.as_bytes(), Some(&signed(&body))).await,
        Err(WebhookError::NotConfigured)
    ));

    let webhooks = WebhookService::new(
        Clock::fixed(fixed_now()),
        Some(SECRET.into()),
        Arc::new(repo.clone()),
    );
    assert!(matches!(
        webhooks.handle(body.as_bytes(), None).await,
        Err(WebhookError::MissingSignature)
    ));
    assert!(matches!(
        unconfigured.handle(body.as_bytes(), None).await,
        Err(WebhookError::MissingSignature)
    ));

    let forged = signature_header(body.as_bytes(), "whsec_wrong", FIXED_TEST_TIMESTAMP).unwrap();
    assert!(matches!(
        webhooks.handle(body.as_bytes(), Some(&forged)).await,
        Err(WebhookError::SignatureMismatch)
    ));

    assert!(repo.get_by_token("cs_reject").await.unwrap().is_none());
}

#[tokio::test]
async fn canceled_subscription_stays_locked_after_checkout_replays() {
    let repo = InMemoryRepository::new();
    let webhooks = webhooks(&repo);
    let entitlements = EntitlementService::new(
        Clock::fixed(fixed_now()),
        Arc::new(PaidCheckout),
        Arc::new(repo.clone()),
    );
    let guard = guard(&repo);

    entitlements.verify_checkout("cs_replay").await.unwrap();
    assert_eq!(
        guard.check("/study", Some("cs_replay")).await,
        AccessDecision::Allow
    );

    let body = subscription_update("canceled");
    webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        guard.check("/study", Some("cs_replay")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );

    let record = entitlements.verify_checkout("cs_replay").await.unwrap();
    assert_eq!(record.status(), SubscriptionStatus::Canceled);
    assert_eq!(
        guard.check("/study", Some("cs_replay")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );

    let body = completed("cs_replay");
    let outcome = webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::AlreadyRecorded {
            token: "cs_replay".into()
        }
    );
    assert_eq!(
        guard.check("/study", Some("cs_replay")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );
}

#[tokio::test]
async fn unpaid_completion_grants_nothing_until_payment_settles() {
    let repo = InMemoryRepository::new();
    let webhooks = webhooks(&repo);
    let guard = guard(&repo);

    let body = completed_with("cs_delayed", "unpaid");
    let outcome = webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::AwaitingPayment {
            session_id: "cs_delayed".into()
        }
    );
    assert!(repo.get_by_token("cs_delayed").await.unwrap().is_none());
    assert_eq!(
        guard.check("/study", Some("cs_delayed")).await,
        AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
    );

    let body = completed_with("cs_delayed", "paid")
        .replace("checkout.session.completed", "checkout.session.async_payment_succeeded");
    let outcome = webhooks
        .handle(body.as_bytes(), Some(&signed(&body)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Recorded {
            token: "cs_delayed".into()
        }
    );
    assert_eq!(
        guard.check("/study", Some("cs_delayed")).await,
        AccessDecision::Allow
    );
}
