use chrono::{DateTime, Utc};
use exam_core::model::{SubscriptionRecord, SubscriptionStatus};

use super::SqliteRepository;
use super::mapping::{bool_to_i64, map_subscription_row};
use crate::repository::{StorageError, SubscriptionRepository};

#[async_trait::async_trait]
impl SubscriptionRepository for SqliteRepository {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO subscriptions (token, customer_id, subscription_id, status, cancel_at_period_end, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(token) DO UPDATE SET
                customer_id = excluded.customer_id,
                subscription_id = excluded.subscription_id,
                status = excluded.status,
                cancel_at_period_end = excluded.cancel_at_period_end,
                updated_at = MAX(excluded.updated_at, subscriptions.created_at)
            ",
        )
        .bind(record.token())
        .bind(record.customer_id())
        .bind(record.subscription_id())
        .bind(record.status().as_str())
        .bind(bool_to_i64(record.cancel_at_period_end()))
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<SubscriptionRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, customer_id, subscription_id, status, cancel_at_period_end, created_at, updated_at
            FROM subscriptions
            WHERE token = ?1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_subscription_row).transpose()
    }

    async fn update_by_subscription(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query(
            r"
            UPDATE subscriptions
            SET status = ?1,
                cancel_at_period_end = ?2,
                updated_at = MAX(?3, created_at)
            WHERE subscription_id = ?4
            ",
        )
        .bind(status.as_str())
        .bind(bool_to_i64(cancel_at_period_end))
        .bind(at)
        .bind(subscription_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected())
    }
}
