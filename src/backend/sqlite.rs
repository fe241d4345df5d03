//! SQLCipher-backed persistence
//!
//! One database file holds two tables:
//! - `keys`: raw master key blobs, one row per key id
//! - `entries`: encrypted records, indexed on category and created_at
//!
//! When a store passphrase is supplied the whole file is encrypted by
//! SQLCipher on top of the per-field AES-GCM envelopes.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::debug;

use super::{KeyBackend, PersistenceBackend};
use crate::aliases::StorePassphrase;
use crate::consts::DB_KDF_ITERATIONS;
use crate::enums::IndexQuery;
use crate::error::Result;
use crate::models::PersistedRecord;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS keys (
        key_id     TEXT PRIMARY KEY,
        key_blob   BLOB NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        replaced_at TEXT
    );

    CREATE TABLE IF NOT EXISTS entries (
        id                   TEXT PRIMARY KEY,
        category             TEXT NOT NULL,
        encrypted_body       TEXT NOT NULL,
        encrypted_attachment TEXT,
        created_at           INTEGER NOT NULL,
        commitment_hash      TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_entries_category ON entries(category);
    CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at);
"#;

const SELECT_RECORD: &str = "SELECT id, category, encrypted_body, encrypted_attachment, \
     created_at, commitment_hash FROM entries";

/// Rusqlite connection behind an async mutex. Calls are short local
/// statements, so they run inline on the calling task.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the store at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P, passphrase: Option<&StorePassphrase>) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path.as_ref())?;
        debug!(path = %db_path.as_ref().display(), "opened store database");
        Self::init(conn, passphrase)
    }

    /// Private, non-persistent database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, passphrase: Option<&StorePassphrase>) -> Result<Self> {
        if let Some(pass) = passphrase {
            conn.pragma_update(None, "key", pass.expose_secret().as_str())?;
            conn.execute_batch(&format!(
                r#"
                PRAGMA cipher_page_size = 4096;
                PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
                PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
                PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
                "#
            ))?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedRecord> {
    Ok(PersistedRecord {
        id: row.get(0)?,
        category: row.get(1)?,
        encrypted_body: row.get(2)?,
        encrypted_attachment: row.get(3)?,
        created_at: row.get(4)?,
        commitment_hash: row.get(5)?,
    })
}

#[async_trait]
impl PersistenceBackend for SqliteBackend {
    async fn put(&self, record: &PersistedRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO entries (
                id, category, encrypted_body, encrypted_attachment,
                created_at, commitment_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                &record.id,
                &record.category,
                &record.encrypted_body,
                &record.encrypted_attachment,
                record.created_at,
                &record.commitment_hash,
            ],
        )?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PersistedRecord>> {
        let conn = self.conn.lock().await;
        let record = conn
            .query_row(
                &format!("{SELECT_RECORD} WHERE id = ?1"),
                [id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    async fn get_all_by_index(&self, query: &IndexQuery) -> Result<Vec<PersistedRecord>> {
        let conn = self.conn.lock().await;
        let records = match query {
            IndexQuery::Category(category) => {
                let mut stmt = conn.prepare(&format!("{SELECT_RECORD} WHERE category = ?1"))?;
                let rows = stmt.query_map([category], record_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            IndexQuery::CreatedAt(ts) => {
                let mut stmt = conn.prepare(&format!("{SELECT_RECORD} WHERE created_at = ?1"))?;
                let rows = stmt.query_map([ts], record_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(records)
    }

    async fn get_all(&self) -> Result<Vec<PersistedRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(SELECT_RECORD)?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }
}

#[async_trait]
impl KeyBackend for SqliteBackend {
    async fn load_key(&self, key_id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().await;
        let blob = conn
            .query_row(
                "SELECT key_blob FROM keys WHERE key_id = ?1",
                [key_id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(blob)
    }

    async fn insert_key_if_absent(&self, key_id: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO keys (key_id, key_blob) VALUES (?1, ?2)",
            params![key_id, bytes],
        )?;
        let stored: Vec<u8> = tx.query_row(
            "SELECT key_blob FROM keys WHERE key_id = ?1",
            [key_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(stored)
    }

    async fn replace_key(&self, key_id: &str, bytes: &[u8]) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO keys (key_id, key_blob) VALUES (?1, ?2)
            ON CONFLICT(key_id) DO UPDATE SET
                key_blob = excluded.key_blob,
                replaced_at = datetime('now')
            "#,
            params![key_id, bytes],
        )?;
        Ok(())
    }

    async fn delete_key(&self, key_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM keys WHERE key_id = ?1", [key_id])?;
        Ok(())
    }
}
