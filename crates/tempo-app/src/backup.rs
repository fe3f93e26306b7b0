//! JSON backup export and import.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tempo_db::{RestoreStats, Snapshot};

use crate::{Tempo, UseCaseError};

/// Format version written to and accepted from backup files.
pub const BACKUP_VERSION: u32 = 1;

/// On-disk backup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Faults reading or writing a backup file.
#[derive(Debug, Error)]
enum BackupFileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid backup file: {0}")]
    Parse(serde_json::Error),

    #[error("cannot encode backup: {0}")]
    Encode(serde_json::Error),

    #[error("unsupported backup version {found} (expected {BACKUP_VERSION})")]
    Version { found: u32 },
}

/// Counts of what an export wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub activities: usize,
    pub tags: usize,
    pub goals: usize,
    pub entries: usize,
}

impl Tempo {
    /// Writes every record to `path` as pretty JSON.
    pub async fn export_backup(
        &self,
        path: PathBuf,
        exported_at: DateTime<Utc>,
    ) -> Result<ExportSummary, UseCaseError> {
        self.run("export_backup", move |store| {
            let backup = Backup {
                version: BACKUP_VERSION,
                exported_at,
                snapshot: store.snapshot()?,
            };
            let summary = ExportSummary {
                activities: backup.snapshot.activities.len(),
                tags: backup.snapshot.tags.len(),
                goals: backup.snapshot.goals.len(),
                entries: backup.snapshot.entries.len(),
            };
            write_backup(&path, &backup).map_err(|err| UseCaseError::Export {
                path: path.clone(),
                message: err.to_string(),
            })?;
            tracing::debug!(path = %path.display(), ?summary, "exported backup");
            Ok(summary)
        })
        .await
    }

    /// Reads a backup from `path` and adds its records to the store.
    pub async fn import_backup(&self, path: PathBuf) -> Result<RestoreStats, UseCaseError> {
        self.run("import_backup", move |store| {
            let backup = read_backup(&path).map_err(|err| UseCaseError::Import {
                path: path.clone(),
                message: err.to_string(),
            })?;
            Ok(store.restore(&backup.snapshot)?)
        })
        .await
    }
}

fn write_backup(path: &Path, backup: &Backup) -> Result<(), BackupFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, backup).map_err(BackupFileError::Encode)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn read_backup(path: &Path) -> Result<Backup, BackupFileError> {
    let content = fs::read_to_string(path)?;
    let backup: Backup = serde_json::from_str(&content).map_err(BackupFileError::Parse)?;
    if backup.version != BACKUP_VERSION {
        return Err(BackupFileError::Version {
            found: backup.version,
        });
    }
    Ok(backup)
}
