// tests/store_tests.rs
mod common;
use common::{TestStore, RUN_BODY, RUN_CREATED_AT};

use diary_vault::core::util::sha256_hex;
use diary_vault::error::CoreError;
use diary_vault::{CipherEnvelope, PersistenceBackend};

#[tokio::test]
async fn test_save_and_get_run_entry() {
    let t = TestStore::new();
    let id = t
        .store
        .save("run_5km", RUN_BODY, None, RUN_CREATED_AT)
        .await
        .unwrap();

    let entry = t.store.get(&id).await.unwrap().expect("entry exists");
    assert_eq!(entry.id, id);
    assert_eq!(entry.category, "run_5km");
    assert_eq!(entry.body, RUN_BODY);
    assert_eq!(entry.attachment, None);
    assert_eq!(entry.created_at, RUN_CREATED_AT);
    assert_eq!(
        entry.commitment_hash,
        sha256_hex(format!("run_5km:{RUN_BODY}:{RUN_CREATED_AT}").as_bytes())
    );
    assert_eq!(
        entry.commitment_hash,
        "911ebdeec61fd8bce094e1f860d4df62338e511a970f91160b2f0360280a52a7"
    );
}

#[tokio::test]
async fn test_persisted_record_holds_no_plaintext() {
    let t = TestStore::new();
    let id = t
        .store
        .save("journal", "a very private thought", Some(&b"PNG bytes"[..]), 42)
        .await
        .unwrap();

    let record = t.backend.get(&id).await.unwrap().unwrap();
    assert_eq!(record.category, "journal");
    assert_eq!(record.created_at, 42);
    assert!(!record.encrypted_body.contains("private"));
    CipherEnvelope::deserialize(&record.encrypted_body).unwrap();
    CipherEnvelope::deserialize(record.encrypted_attachment.as_deref().unwrap()).unwrap();
    assert_ne!(
        record.encrypted_body,
        record.encrypted_attachment.clone().unwrap()
    );
    assert_eq!(
        t.store.get_record(&id).await.unwrap().unwrap(),
        record
    );
}

#[tokio::test]
async fn test_attachment_roundtrip() {
    let t = TestStore::new();
    let attachment: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let id = t
        .store
        .save("photos", "sunrise", Some(attachment.as_slice()), 1)
        .await
        .unwrap();

    let entry = t.store.get(&id).await.unwrap().unwrap();
    assert_eq!(entry.attachment.as_deref(), Some(attachment.as_slice()));
}

#[tokio::test]
async fn test_get_unknown_id_is_none() {
    let t = TestStore::new();
    assert!(t.store.get("does-not-exist").await.unwrap().is_none());
    t.store.save("a", "b", None, 1).await.unwrap();
    assert!(t.store.get("does-not-exist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_body_writes_nothing() {
    let t = TestStore::new();
    let result = t.store.save("journal", "", None, 1).await;
    assert!(matches!(result, Err(CoreError::EmptyInput)));

    let result = t.store.save("journal", "text", Some(&b""[..]), 1).await;
    assert!(matches!(result, Err(CoreError::EmptyInput)));

    assert!(t.backend.is_empty().await);
}

#[tokio::test]
async fn test_invalid_category_is_rejected() {
    let t = TestStore::new();
    assert!(matches!(
        t.store.save("", "body", None, 1).await,
        Err(CoreError::InvalidCategory(_))
    ));
    assert!(matches!(
        t.store.save("run:5km", "body", None, 1).await,
        Err(CoreError::InvalidCategory(_))
    ));
    assert!(t.backend.is_empty().await);
}

#[tokio::test]
async fn test_list_all_is_newest_first() {
    let t = TestStore::new();
    for ts in [100, 300, 200] {
        t.store
            .save("journal", &format!("entry at {ts}"), None, ts)
            .await
            .unwrap();
    }

    let order: Vec<i64> = t
        .store
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|e| e.created_at)
        .collect();
    assert_eq!(order, vec![300, 200, 100]);

    let record_order: Vec<i64> = t
        .store
        .list_records()
        .await
        .unwrap()
        .iter()
        .map(|r| r.created_at)
        .collect();
    assert_eq!(record_order, vec![300, 200, 100]);
}

#[tokio::test]
async fn test_list_by_category_filters() {
    let t = TestStore::new();
    t.store.save("run_5km", "first run", None, 1).await.unwrap();
    t.store.save("run_5km", "second run", None, 2).await.unwrap();
    t.store.save("reading", "a chapter", None, 3).await.unwrap();

    let runs: Vec<String> = t
        .store
        .list_by_category("run_5km")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.body)
        .collect();
    assert_eq!(runs, vec!["second run", "first run"]);

    assert_eq!(t.store.list_by_category("reading").await.unwrap().len(), 1);
    assert!(t.store.list_by_category("swim").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_category_never_decrypts_other_categories() {
    let t = TestStore::new();
    t.store.save("run", "easy 5k", None, 1).await.unwrap();

    // a record sealed under a key this store has never seen
    let other = TestStore::new();
    let foreign_id = other.store.save("sleep", "eight hours", None, 2).await.unwrap();
    let foreign = other.store.get_record(&foreign_id).await.unwrap().unwrap();
    t.backend.put(&foreign).await.unwrap();

    let runs = t.store.list_by_category("run").await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].body, "easy 5k");

    assert!(matches!(
        t.store.list_all().await,
        Err(CoreError::Authentication)
    ));
    assert_eq!(t.store.list_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let t = TestStore::new();
    let id = t.store.save("journal", "temp", None, 1).await.unwrap();

    t.store.remove(&id).await.unwrap();
    assert!(t.store.get(&id).await.unwrap().is_none());
    t.store.remove(&id).await.unwrap();
    t.store.remove("never-existed").await.unwrap();
}

#[tokio::test]
async fn test_deleting_key_crypto_shreds_entries() {
    let t = TestStore::new();
    let id = t
        .store
        .save("run_5km", RUN_BODY, None, RUN_CREATED_AT)
        .await
        .unwrap();

    t.keys.delete_key(t.store.key_id()).await.unwrap();

    let err = t.store.get(&id).await.unwrap_err();
    assert!(matches!(err, CoreError::Authentication));
    assert!(err.is_key_problem());

    // still listable as ciphertext and still removable
    let records = t.store.list_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(
        t.store.list_all().await,
        Err(CoreError::Authentication)
    ));
    t.store.remove(&id).await.unwrap();
    assert!(t.store.get(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_new_key_after_delete_cannot_read_old_entries() {
    let t = TestStore::new();
    let old = t.store.save("journal", "before", None, 1).await.unwrap();
    t.keys.delete_key(t.store.key_id()).await.unwrap();

    let new = t.store.save("journal", "after", None, 2).await.unwrap();
    assert_eq!(t.store.get(&new).await.unwrap().unwrap().body, "after");
    assert!(matches!(
        t.store.get(&old).await,
        Err(CoreError::Authentication)
    ));
}

#[tokio::test]
async fn test_clear_keeps_keys() {
    let t = TestStore::new();
    t.store.save("a", "one", None, 1).await.unwrap();
    t.store.save("b", "two", None, 2).await.unwrap();

    t.store.clear().await.unwrap();
    assert!(t.store.list_all().await.unwrap().is_empty());
    assert!(t.keys.has_key(t.store.key_id()).await.unwrap());
}

#[tokio::test]
async fn test_save_now_stamps_current_time() {
    let t = TestStore::new();
    let before = chrono::Utc::now().timestamp_millis();
    let id = t.store.save_now("journal", "now", None).await.unwrap();
    let after = chrono::Utc::now().timestamp_millis();

    let entry = t.store.get(&id).await.unwrap().unwrap();
    assert!(entry.created_at >= before && entry.created_at <= after);
}
