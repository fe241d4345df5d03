// tests/key_tests.rs
mod common;

use std::sync::Arc;

use diary_vault::aliases::MasterKey32;
use diary_vault::backend::KeyBackend;
use diary_vault::enums::EncryptionAlgorithm;
use diary_vault::error::CoreError;
use diary_vault::key_ops::{generate_key, key_from_bytes, PortableKey};
use diary_vault::{KeyManager, MemoryBackend};

fn manager() -> (Arc<MemoryBackend>, KeyManager) {
    common::setup();
    let backend = Arc::new(MemoryBackend::new());
    let keys = KeyManager::new(backend.clone());
    (backend, keys)
}

#[test]
fn test_generate_key_is_random_and_32_bytes() {
    let key1 = generate_key();
    let key2 = generate_key();
    assert_eq!(key1.expose_secret().len(), 32);
    assert_ne!(
        key1.expose_secret().as_slice(),
        key2.expose_secret().as_slice()
    );
}

#[test]
fn test_portable_key_representation_is_correct() {
    let key = MasterKey32::new([0x42; 32]);
    let portable = PortableKey::from_key(&key);

    assert_eq!(portable.algorithm, EncryptionAlgorithm::Aes256Gcm);
    assert_eq!(portable.key_length_bits, 256);
    assert_eq!(
        portable.raw_key_base64,
        "QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI="
    );

    let json: serde_json::Value = serde_json::from_str(&portable.to_json().unwrap()).unwrap();
    assert_eq!(json["algorithm"], "AES-GCM");
    assert_eq!(json["keyLengthBits"], 256);

    let back = PortableKey::from_json(&portable.to_json().unwrap()).unwrap();
    assert_eq!(back.to_key().unwrap().expose_secret(), key.expose_secret());
}

#[test]
fn test_portable_key_validation() {
    let good = PortableKey::from_key(&generate_key());

    let mut short = good.clone();
    short.raw_key_base64 = "QkJC".into();
    assert!(matches!(short.to_key(), Err(CoreError::Format(_))));

    let mut bits = good.clone();
    bits.key_length_bits = 128;
    assert!(matches!(bits.to_key(), Err(CoreError::Format(_))));

    let mut garbage = good.clone();
    garbage.raw_key_base64 = "%%%".into();
    assert!(matches!(garbage.to_key(), Err(CoreError::Format(_))));

    assert!(matches!(
        PortableKey::from_json(r#"{"algorithm":"RSA","keyLengthBits":256,"rawKeyBase64":""}"#),
        Err(CoreError::Format(_))
    ));
    assert!(matches!(key_from_bytes(&[1, 2, 3]), Err(CoreError::Format(_))));
}

#[tokio::test]
async fn test_get_or_create_is_lazy_and_stable() {
    let (backend, keys) = manager();
    assert!(!keys.has_key("master").await.unwrap());
    assert!(backend.load_key("master").await.unwrap().is_none());

    let first = keys.get_or_create_key("master").await.unwrap();
    let second = keys.get_or_create_key("master").await.unwrap();
    assert_eq!(first.expose_secret(), second.expose_secret());
    assert!(keys.has_key("master").await.unwrap());

    let other = keys.get_or_create_key("travel").await.unwrap();
    assert_ne!(first.expose_secret(), other.expose_secret());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_callers_share_one_key() {
    let (_backend, keys) = manager();
    let keys = Arc::new(keys);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let keys = keys.clone();
        handles.push(tokio::spawn(async move {
            let key = keys.get_or_create_key("master").await.unwrap();
            key.expose_secret().to_vec()
        }));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    let stored = keys.get_key("master").await.unwrap().unwrap();
    assert!(seen.iter().all(|k| k.as_slice() == stored.expose_secret().as_slice()));
}

#[tokio::test]
async fn test_racing_managers_on_one_backend_adopt_the_stored_key() {
    let (backend, keys_a) = manager();
    let keys_b = KeyManager::new(backend.clone());

    let (a, b) = tokio::join!(
        keys_a.get_or_create_key("master"),
        keys_b.get_or_create_key("master")
    );
    assert_eq!(a.unwrap().expose_secret(), b.unwrap().expose_secret());
}

#[tokio::test]
async fn test_export_absent_key_is_none_without_side_effects() {
    let (_backend, keys) = manager();
    assert!(keys.export_key("master").await.unwrap().is_none());
    assert!(!keys.has_key("master").await.unwrap());
}

#[tokio::test]
async fn test_import_replaces_existing_key() {
    let (_backend, keys) = manager();
    let original = keys.get_or_create_key("master").await.unwrap();

    let replacement = MasterKey32::new([9u8; 32]);
    keys.import_key("master", &PortableKey::from_key(&replacement))
        .await
        .unwrap();

    let current = keys.get_key("master").await.unwrap().unwrap();
    assert_eq!(current.expose_secret(), &[9u8; 32]);
    assert_ne!(current.expose_secret(), original.expose_secret());

    let exported = keys.export_key("master").await.unwrap().unwrap();
    assert_eq!(exported, PortableKey::from_key(&replacement));
}

#[tokio::test]
async fn test_failed_import_leaves_existing_key_untouched() {
    let (_backend, keys) = manager();
    let original = keys.get_or_create_key("master").await.unwrap();

    let mut bad = PortableKey::from_key(&generate_key());
    bad.raw_key_base64.truncate(10);
    assert!(keys.import_key("master", &bad).await.is_err());

    let current = keys.get_key("master").await.unwrap().unwrap();
    assert_eq!(current.expose_secret(), original.expose_secret());
}

#[tokio::test]
async fn test_import_into_absent_id_creates_it() {
    let (_backend, keys) = manager();
    let portable = PortableKey::from_key(&MasterKey32::new([3u8; 32]));
    keys.import_key("restored", &portable).await.unwrap();
    assert!(keys.has_key("restored").await.unwrap());
}

#[tokio::test]
async fn test_delete_returns_to_absent_and_regenerates_fresh() {
    let (_backend, keys) = manager();
    let before = keys.get_or_create_key("master").await.unwrap();

    keys.delete_key("master").await.unwrap();
    assert!(!keys.has_key("master").await.unwrap());
    // deleting twice is fine
    keys.delete_key("master").await.unwrap();

    let after = keys.get_or_create_key("master").await.unwrap();
    assert_ne!(before.expose_secret(), after.expose_secret());
}
