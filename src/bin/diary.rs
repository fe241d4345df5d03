// src/bin/diary.rs
//! Command-line front end for a local diary store

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use diary_vault::config::Config;
use diary_vault::core::util::validate_category;
use diary_vault::export::{read_bundle, write_bundle};
use diary_vault::{
    hash_commitment, load_config, DiaryEntry, DirBackupSink, EntryStore, KeyManager, PortableKey,
    RetryPolicy, RetryingSink, SqliteBackend,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diary", about = "Encrypted local diary with publishable commitments")]
struct Cli {
    /// Store database (defaults to config / DIARY_STORE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Key id to encrypt under
    #[arg(long, global = true)]
    key_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an entry
    Add {
        category: String,
        body: String,
        /// File whose bytes become the attachment
        #[arg(long)]
        attachment: Option<PathBuf>,
        /// Epoch millis; defaults to now
        #[arg(long)]
        created_at: Option<i64>,
    },
    /// Show one entry
    Show { id: String },
    /// List entries, newest first
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove an entry
    Remove { id: String },
    /// Write every record to a bundle file
    Export { file: PathBuf },
    /// Load records from a bundle file
    Import { file: PathBuf },
    /// Copy one entry's ciphertext into a backup directory
    Backup {
        id: String,
        #[arg(long)]
        dir: PathBuf,
    },
    /// Bring an entry back from a backup directory
    Restore {
        locator: String,
        #[arg(long)]
        dir: PathBuf,
    },
    /// Print the commitment digest for the given fields
    Commit {
        category: String,
        body: String,
        created_at: i64,
    },
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Print the portable key descriptor as JSON
    Export,
    /// Replace the key from a descriptor file
    Import { file: PathBuf },
    /// Delete the key; existing entries become unreadable
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

fn print_entry(entry: &DiaryEntry) {
    println!(
        "{}  [{}]  {}  commitment={}",
        entry.id, entry.category, entry.created_at, entry.commitment_hash
    );
    println!("    {}", entry.body);
    if let Some(att) = &entry.attachment {
        println!("    attachment: {} bytes", att.len());
    }
}

fn open_store(
    db: Option<&PathBuf>,
    key_id: &str,
    config: &Config,
) -> Result<(Arc<KeyManager>, EntryStore)> {
    let db_path = db.cloned().unwrap_or_else(|| config.store_db_path());
    let passphrase = config.store_passphrase();
    let backend = Arc::new(
        SqliteBackend::open(&db_path, passphrase.as_ref())
            .with_context(|| format!("failed to open store at {}", db_path.display()))?,
    );
    info!(path = %db_path.display(), "store opened");

    let keys = Arc::new(KeyManager::new(backend.clone()));
    let store = EntryStore::with_key_id(backend, keys.clone(), key_id)
        .with_max_backup_bytes(config.backup.max_blob_bytes);
    Ok((keys, store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config();

    let key_id = cli
        .key_id
        .clone()
        .unwrap_or_else(|| config.keys.default_key_id.clone());
    let db = cli.db.as_ref();

    match cli.command {
        Command::Add {
            category,
            body,
            attachment,
            created_at,
        } => {
            let attachment = attachment
                .map(std::fs::read)
                .transpose()
                .context("failed to read attachment")?;
            let (_, store) = open_store(db, &key_id, config)?;
            let id = match created_at {
                Some(ts) => store.save(&category, &body, attachment.as_deref(), ts).await?,
                None => store.save_now(&category, &body, attachment.as_deref()).await?,
            };
            println!("{id}");
        }
        Command::Show { id } => {
            let (_, store) = open_store(db, &key_id, config)?;
            match store.get(&id).await {
                Ok(Some(entry)) => print_entry(&entry),
                Ok(None) => bail!("no entry with id {id}"),
                Err(e) if e.is_key_problem() => {
                    bail!("entry {id} exists but cannot be decrypted; restore key '{key_id}' first")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::List { category } => {
            let (_, store) = open_store(db, &key_id, config)?;
            let entries = match category {
                Some(c) => store.list_by_category(&c).await?,
                None => store.list_all().await?,
            };
            for entry in &entries {
                print_entry(entry);
            }
        }
        Command::Remove { id } => {
            let (_, store) = open_store(db, &key_id, config)?;
            store.remove(&id).await?;
        }
        Command::Export { file } => {
            let (_, store) = open_store(db, &key_id, config)?;
            let bundle = store.export_all().await?;
            write_bundle(&bundle, &file)?;
            println!("exported {} record(s) → {}", bundle.total_records, file.display());
        }
        Command::Import { file } => {
            let (_, store) = open_store(db, &key_id, config)?;
            let bundle = read_bundle(&file)?;
            let count = store.import_all(&bundle).await?;
            println!("imported {count} record(s)");
        }
        Command::Backup { id, dir } => {
            let (_, store) = open_store(db, &key_id, config)?;
            let sink = RetryingSink::new(
                DirBackupSink::new(&dir),
                RetryPolicy::from_config(&config.backup),
            );
            match store.backup_entry(&id, &sink).await? {
                Some(receipt) => println!(
                    "{}  ({} bytes in {})",
                    receipt.locator,
                    receipt.size,
                    sink.inner().root().display()
                ),
                None => bail!("no entry with id {id}"),
            }
        }
        Command::Restore { locator, dir } => {
            let (_, store) = open_store(db, &key_id, config)?;
            let sink = RetryingSink::new(
                DirBackupSink::new(&dir),
                RetryPolicy::from_config(&config.backup),
            );
            match store.restore_from_backup(&locator, &sink).await? {
                Some(id) => println!("{id}"),
                None => bail!("nothing stored under {locator}"),
            }
        }
        Command::Commit {
            category,
            body,
            created_at,
        } => {
            validate_category(&category)?;
            println!("{}", hash_commitment(&category, &body, created_at));
        }
        Command::Key(KeyCommand::Export) => {
            let (keys, _) = open_store(db, &key_id, config)?;
            match keys.export_key(&key_id).await? {
                Some(portable) => {
                    eprintln!("SECURITY: this is your raw key, store it offline.");
                    println!("{}", portable.to_json()?);
                }
                None => bail!("no key named '{key_id}'"),
            }
        }
        Command::Key(KeyCommand::Import { file }) => {
            let (keys, _) = open_store(db, &key_id, config)?;
            let content = std::fs::read_to_string(&file)?;
            let portable = PortableKey::from_json(&content)?;
            keys.import_key(&key_id, &portable).await?;
            println!("key '{key_id}' imported");
        }
        Command::Key(KeyCommand::Delete { yes }) => {
            if !yes {
                bail!("deleting a key makes its entries unreadable forever; pass --yes");
            }
            let (keys, _) = open_store(db, &key_id, config)?;
            keys.delete_key(&key_id).await?;
            println!("key '{key_id}' deleted");
        }
    }

    Ok(())
}
