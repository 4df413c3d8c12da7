use chrono::Duration;
use exam_core::model::{SubscriptionRecord, SubscriptionStatus};
use exam_core::time::fixed_now;
use storage::repository::{Storage, SubscriptionRepository};
use storage::sqlite::SqliteRepository;

fn paid(token: &str, subscription: &str) -> SubscriptionRecord {
    SubscriptionRecord::new(token, SubscriptionStatus::Active, fixed_now())
        .unwrap()
        .with_customer(Some("cus_123".into()))
        .with_subscription(Some(subscription.into()))
}

#[tokio::test]
async fn sqlite_roundtrip_persists_subscription() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sub_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = paid("cs_test_1", "sub_1");
    repo.upsert(&record).await.unwrap();

    let fetched = repo.get_by_token("cs_test_1").await.unwrap().expect("row");
    assert_eq!(fetched, record);
    assert!(repo.get_by_token("cs_other").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_upsert_preserves_created_at() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sub_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert(&paid("cs_test_2", "sub_2")).await.unwrap();

    let later = fixed_now() + Duration::minutes(30);
    let again = SubscriptionRecord::new("cs_test_2", SubscriptionStatus::Trialing, later)
        .unwrap()
        .with_subscription(Some("sub_2".into()));
    repo.upsert(&again).await.unwrap();

    let fetched = repo.get_by_token("cs_test_2").await.unwrap().expect("row");
    assert_eq!(fetched.created_at(), fixed_now());
    assert_eq!(fetched.updated_at(), later);
    assert_eq!(fetched.status(), SubscriptionStatus::Trialing);
    assert_eq!(fetched.customer_id(), None);
}

#[tokio::test]
async fn sqlite_status_updates_follow_subscription_id() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sub_status?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert(&paid("cs_a", "sub_shared")).await.unwrap();
    repo.upsert(&paid("cs_b", "sub_shared")).await.unwrap();
    repo.upsert(&paid("cs_c", "sub_other")).await.unwrap();

    let at = fixed_now() + Duration::days(31);
    let touched = repo
        .update_by_subscription("sub_shared", SubscriptionStatus::PastDue, true, at)
        .await
        .unwrap();
    assert_eq!(touched, 2);

    let a = repo.get_by_token("cs_a").await.unwrap().expect("row");
    assert_eq!(a.status(), SubscriptionStatus::PastDue);
    assert!(a.cancel_at_period_end());
    assert_eq!(a.updated_at(), at);
    assert!(!a.is_entitled());

    let c = repo.get_by_token("cs_c").await.unwrap().expect("row");
    assert!(c.is_entitled());

    let none = repo
        .update_by_subscription("sub_missing", SubscriptionStatus::Canceled, false, at)
        .await
        .unwrap();
    assert_eq!(none, 0);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let url = "sqlite:file:memdb_sub_migrate?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let storage = Storage::sqlite(url).await.expect("storage");
    storage
        .subscriptions
        .upsert(&paid("cs_storage", "sub_storage"))
        .await
        .unwrap();
    assert!(
        storage
            .subscriptions
            .get_by_token("cs_storage")
            .await
            .unwrap()
            .is_some()
    );
}
