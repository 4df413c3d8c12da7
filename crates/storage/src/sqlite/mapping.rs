use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn bool_to_i64(v: bool) -> i64 {
    i64::from(v)
}

fn i64_to_bool(field: &'static str, v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::Serialization(format!(
            "invalid {field}: {other}"
        ))),
    }
}

pub(crate) fn map_subscription_row(row: &SqliteRow) -> Result<SubscriptionRecord, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    let status: SubscriptionStatus = status.parse().map_err(ser)?;
    let cancel = i64_to_bool(
        "cancel_at_period_end",
        row.try_get("cancel_at_period_end").map_err(ser)?,
    )?;

    SubscriptionRecord::from_persisted(
        row.try_get("token").map_err(ser)?,
        row.try_get("customer_id").map_err(ser)?,
        row.try_get("subscription_id").map_err(ser)?,
        status,
        cancel,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}
