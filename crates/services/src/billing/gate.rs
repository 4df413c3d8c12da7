use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use storage::repository::{StorageError, SubscriptionRepository};

/// Cookie carrying the visitor's entitlement token.
pub const ENTITLEMENT_COOKIE: &str = "mizo_sub";

/// Where unentitled visitors are sent.
pub const SUBSCRIBE_REDIRECT: &str = "/?reason=subscribe";

const STUDY_PREFIX: &str = "/study";

/// Answers whether a visitor token grants study access.
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` when the backing lookup fails.
    async fn is_entitled(&self, token: &str) -> Result<bool, StorageError>;
}

/// Gate backed by stored subscription records.
#[derive(Clone)]
pub struct SubscriptionGate {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionGate {
    #[must_use]
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }
}

#[async_trait]
impl EntitlementGate for SubscriptionGate {
    async fn is_entitled(&self, token: &str) -> Result<bool, StorageError> {
        if token.trim().is_empty() {
            return Ok(false);
        }
        let record = self.subscriptions.get_by_token(token).await?;
        Ok(record.is_some_and(|r| r.is_entitled()))
    }
}

/// Result of a route access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Redirect(&'static str),
}

/// Keeps `/study` routes behind an active subscription.
#[derive(Clone)]
pub struct StudyGuard {
    gate: Arc<dyn EntitlementGate>,
}

impl StudyGuard {
    #[must_use]
    pub fn new(gate: Arc<dyn EntitlementGate>) -> Self {
        Self { gate }
    }

    #[must_use]
    pub fn guards(path: &str) -> bool {
        path == STUDY_PREFIX
            || path
                .strip_prefix(STUDY_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Decide access for `path` given the entitlement cookie, if any.
    /// Lookup failures count as "not entitled".
    pub async fn check(&self, path: &str, cookie: Option<&str>) -> AccessDecision {
        if !Self::guards(path) {
            return AccessDecision::Allow;
        }
        let Some(token) = cookie.filter(|t| !t.trim().is_empty()) else {
            return AccessDecision::Redirect(SUBSCRIBE_REDIRECT);
        };
        match self.gate.is_entitled(token).await {
            Ok(true) => AccessDecision::Allow,
            Ok(false) => AccessDecision::Redirect(SUBSCRIBE_REDIRECT),
            Err(err) => {
                warn!(error = %err, %path, "entitlement lookup failed; denying access");
                AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
    use exam_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    struct FailingGate;

    #[async_trait]
    impl EntitlementGate for FailingGate {
        async fn is_entitled(&self, _token: &str) -> Result<bool, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    async fn guard_with(status: SubscriptionStatus) -> StudyGuard {
        let repo = InMemoryRepository::new();
        let record = SubscriptionRecord::new("cs_live", status, fixed_now()).unwrap();
        repo.upsert(&record).await.unwrap();
        StudyGuard::new(Arc::new(SubscriptionGate::new(Arc::new(repo))))
    }

    #[test]
    fn only_study_tree_is_guarded() {
        assert!(StudyGuard::guards("/study"));
        assert!(StudyGuard::guards("/study/motors"));
        assert!(!StudyGuard::guards("/"));
        assert!(!StudyGuard::guards("/studying"));
        assert!(!StudyGuard::guards("/api/verify-session"));
    }

    #[tokio::test]
    async fn public_paths_pass_without_cookie() {
        let guard = guard_with(SubscriptionStatus::Canceled).await;
        assert_eq!(guard.check("/", None).await, AccessDecision::Allow);
    }

    #[tokio::test]
    async fn study_requires_entitled_cookie() {
        let guard = guard_with(SubscriptionStatus::Active).await;
        assert_eq!(
            guard.check("/study", None).await,
            AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
        );
        assert_eq!(
            guard.check("/study", Some("cs_unknown")).await,
            AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
        );
        assert_eq!(
            guard.check("/study/exam", Some("cs_live")).await,
            AccessDecision::Allow
        );
    }

    #[tokio::test]
    async fn lapsed_subscription_redirects() {
        let guard = guard_with(SubscriptionStatus::PastDue).await;
        assert_eq!(
            guard.check("/study", Some("cs_live")).await,
            AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
        );
    }

    #[tokio::test]
    async fn gate_errors_deny_access() {
        let guard = StudyGuard::new(Arc::new(FailingGate));
        assert_eq!(
            guard.check("/study", Some("cs_live")).await,
            AccessDecision::Redirect(SUBSCRIBE_REDIRECT)
        );
    }
}
