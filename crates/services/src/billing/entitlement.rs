use std::sync::Arc;

use tracing::{info, warn};

use exam_core::Clock;
use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
use storage::repository::SubscriptionRepository;

use super::checkout::{CheckoutProvider, CheckoutRedirect};
use crate::error::BillingError;

/// Starts purchases and turns verified checkouts into stored entitlements.
#[derive(Clone)]
pub struct EntitlementService {
    clock: Clock,
    checkout: Arc<dyn CheckoutProvider>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl EntitlementService {
    #[must_use]
    pub fn new(
        clock: Clock,
        checkout: Arc<dyn CheckoutProvider>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            clock,
            checkout,
            subscriptions,
        }
    }

    /// Begin a subscription purchase.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` if the provider cannot open a checkout.
    pub async fn begin_checkout(&self) -> Result<CheckoutRedirect, BillingError> {
        self.checkout.create_checkout().await.inspect_err(|err| {
            warn!(error = %err, "checkout could not be started");
        })
    }

    /// Confirm a returning buyer's checkout and store their entitlement.
    /// Returns the record whose token goes in the entitlement cookie.
    ///
    /// A paid checkout stays paid at the provider after the subscription
    /// ends, so a token that is already stored is returned as is; only
    /// subscription webhooks change its status.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::CheckoutIncomplete` when the session is not paid,
    /// or any provider/storage failure.
    pub async fn verify_checkout(
        &self,
        session_id: &str,
    ) -> Result<SubscriptionRecord, BillingError> {
        let session = self.checkout.retrieve_checkout(session_id).await?;
        if !session.is_paid() {
            return Err(BillingError::CheckoutIncomplete {
                status: session.status.unwrap_or_else(|| "unknown".into()),
                payment_status: session.payment_status.unwrap_or_else(|| "unknown".into()),
            });
        }

        if let Some(existing) = self.subscriptions.get_by_token(&session.id).await? {
            info!(token = %existing.token(), status = %existing.status(), "checkout already recorded");
            return Ok(existing);
        }

        let record =
            SubscriptionRecord::new(session.id, SubscriptionStatus::Active, self.clock.now())?
                .with_customer(session.customer)
                .with_subscription(session.subscription);
        self.subscriptions.upsert(&record).await?;
        info!(token = %record.token(), "checkout verified");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::checkout::CheckoutSessionStatus;
    use async_trait::async_trait;
    use exam_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    struct FakeCheckout {
        status: &'static str,
        payment_status: &'static str,
    }

    #[async_trait]
    impl CheckoutProvider for FakeCheckout {
        async fn create_checkout(&self) -> Result<CheckoutRedirect, BillingError> {
            Ok(CheckoutRedirect {
                session_id: "cs_new".into(),
                url: "https://checkout.example/cs_new".into(),
            })
        }

        async fn retrieve_checkout(
            &self,
            session_id: &str,
        ) -> Result<CheckoutSessionStatus, BillingError> {
            if session_id.is_empty() {
                return Err(BillingError::MissingSessionId);
            }
            Ok(CheckoutSessionStatus {
                id: session_id.into(),
                status: Some(self.status.into()),
                payment_status: Some(self.payment_status.into()),
                mode: Some("subscription".into()),
                customer: Some("cus_1".into()),
                subscription: Some("sub_1".into()),
            })
        }
    }

    fn service(
        status: &'static str,
        payment_status: &'static str,
    ) -> (EntitlementService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let service = EntitlementService::new(
            Clock::fixed(fixed_now()),
            Arc::new(FakeCheckout {
                status,
                payment_status,
            }),
            Arc::new(repo.clone()),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn paid_checkout_records_entitlement() {
        let (service, repo) = service("complete", "paid");
        let record = service.verify_checkout("cs_paid").await.unwrap();
        assert_eq!(record.token(), "cs_paid");
        assert_eq!(record.subscription_id(), Some("sub_1"));

        let stored = repo.get_by_token("cs_paid").await.unwrap().unwrap();
        assert!(stored.is_entitled());
        assert_eq!(stored.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn unpaid_checkout_is_rejected_and_not_stored() {
        let (service, repo) = service("open", "unpaid");
        let err = service.verify_checkout("cs_open").await.unwrap_err();
        assert!(matches!(
            err,
            BillingError::CheckoutIncomplete { ref status, ref payment_status }
                if status == "open" && payment_status == "unpaid"
        ));
        assert!(repo.get_by_token("cs_open").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reverifying_a_canceled_checkout_keeps_it_canceled() {
        let (service, repo) = service("complete", "paid");
        service.verify_checkout("cs_paid").await.unwrap();
        let later = fixed_now() + chrono::Duration::days(30);
        let updated = repo
            .update_by_subscription("sub_1", SubscriptionStatus::Canceled, false, later)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let record = service.verify_checkout("cs_paid").await.unwrap();
        assert_eq!(record.status(), SubscriptionStatus::Canceled);
        assert!(!record.is_entitled());
        let stored = repo.get_by_token("cs_paid").await.unwrap().unwrap();
        assert_eq!(stored.status(), SubscriptionStatus::Canceled);
        assert_eq!(stored.updated_at(), later);
    }

    #[tokio::test]
    async fn begin_checkout_returns_redirect() {
        let (service, _) = service("complete", "paid");
        let redirect = service.begin_checkout().await.unwrap();
        assert_eq!(redirect.session_id, "cs_new");
    }

    #[tokio::test]
    async fn missing_session_id_propagates() {
        let (service, _) = service("complete", "paid");
        assert!(matches!(
            service.verify_checkout("").await,
            Err(BillingError::MissingSessionId)
        ));
    }
}
