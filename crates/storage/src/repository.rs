use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for entitlement records.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a record, or replace everything but `created_at` when the token
    /// is already known.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StorageError>;

    /// Look up the record behind an entitlement cookie.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing token is `Ok(None)`.
    async fn get_by_token(&self, token: &str) -> Result<Option<SubscriptionRecord>, StorageError>;

    /// Apply a provider status change to every record linked to
    /// `subscription_id`. Returns how many records changed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the update fails.
    async fn update_by_subscription(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subscriptions: Arc<Mutex<HashMap<String, SubscriptionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryRepository {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .subscriptions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let merged = match guard.get(record.token()) {
            Some(existing) => SubscriptionRecord::from_persisted(
                record.token().to_string(),
                record.customer_id().map(ToString::to_string),
                record.subscription_id().map(ToString::to_string),
                record.status(),
                record.cancel_at_period_end(),
                existing.created_at(),
                record.updated_at().max(existing.created_at()),
            )
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
            None => record.clone(),
        };
        guard.insert(merged.token().to_string(), merged);
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<SubscriptionRecord>, StorageError> {
        let guard = self
            .subscriptions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(token).cloned())
    }

    async fn update_by_subscription(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .subscriptions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut touched = 0;
        for record in guard.values_mut() {
            if record.subscription_id() == Some(subscription_id) {
                record.apply_status(status, cancel_at_period_end, at);
                touched += 1;
            }
        }
        Ok(touched)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let subscriptions: Arc<dyn SubscriptionRepository> = Arc::new(InMemoryRepository::new());
        Self { subscriptions }
    }
}
