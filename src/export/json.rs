use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enums::ExportFormat;
use crate::error::{CoreError, Result};
use crate::models::PersistedRecord;

/// Portable snapshot of persisted records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub export_format: ExportFormat,
    pub exported_at: DateTime<Utc>,
    pub exporter_version: String,
    pub total_records: usize,
    pub records: Vec<PersistedRecord>,
}

impl ExportBundle {
    pub fn new(records: Vec<PersistedRecord>) -> Self {
        Self {
            export_format: ExportFormat::JsonV1,
            exported_at: Utc::now(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
            total_records: records.len(),
            records,
        }
    }

    /// Structural validation of the whole bundle; no key involved
    pub fn validate(&self) -> Result<()> {
        if self.total_records != self.records.len() {
            return Err(CoreError::Format(format!(
                "bundle declares {} records but carries {}",
                self.total_records,
                self.records.len()
            )));
        }
        for record in &self.records {
            record.validate()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CoreError::Format(format!("export bundle: {e}")))
    }
}

/// Write a bundle to `path` as pretty JSON
pub fn write_bundle<P: AsRef<Path>>(bundle: &ExportBundle, path: P) -> Result<()> {
    std::fs::write(path.as_ref(), bundle.to_json()?)?;
    info!(
        count = bundle.total_records,
        path = %path.as_ref().display(),
        exported_at = %bundle.exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "wrote export bundle"
    );
    Ok(())
}

/// Read and validate a bundle from `path`
pub fn read_bundle<P: AsRef<Path>>(path: P) -> Result<ExportBundle> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let bundle = ExportBundle::from_json(&content)?;
    bundle.validate()?;
    Ok(bundle)
}
