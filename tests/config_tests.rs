// tests/config_tests.rs
use std::time::Duration;

use diary_vault::config::{from_file, Config};
use diary_vault::consts::{DEFAULT_KEY_ID, MAX_BACKUP_BLOB_BYTES};
use diary_vault::{CoreError, RetryPolicy};
use tempfile::tempdir;

#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.keys.default_key_id, DEFAULT_KEY_ID);
    assert!(config.keys.store_passphrase.is_none());
    assert_eq!(config.backup.max_blob_bytes, MAX_BACKUP_BLOB_BYTES);
    assert!(config.paths.store_db.ends_with("store.db"));
    assert_eq!(RetryPolicy::from_config(&config.backup), RetryPolicy::standard());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("diary-config.toml");
    std::fs::write(
        &path,
        r#"
        [keys]
        default_key_id = "journal"

        [backup]
        max_attempts = 0
        initial_delay_ms = 250
        "#,
    )
    .unwrap();

    let config = from_file(&path).unwrap();
    assert_eq!(config.keys.default_key_id, "journal");
    assert_eq!(config.backup.max_blob_bytes, MAX_BACKUP_BLOB_BYTES);

    let policy = RetryPolicy::from_config(&config.backup);
    assert_eq!(policy.max_attempts, 1);
    assert_eq!(policy.initial_delay, Duration::from_millis(250));
}

#[test]
fn malformed_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[keys\ndefault_key_id = ").unwrap();
    assert!(matches!(from_file(&path), Err(CoreError::Config(_))));
    assert!(matches!(
        from_file(dir.path().join("missing.toml")),
        Err(CoreError::Io(_))
    ));
}
