//! Output and backup directories for generated artifacts

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::{artifact_file_name, RenderedArtifact};
use crate::{Error, RenderConfig, Result};

/// A stored backup copy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupEntry {
    pub file_name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>, backup_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            backup_dir,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.output_dir.clone(), config.backup_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `artifact` as `receipt_<room>_<timestamp>.<ext>` in the output
    /// directory and return its path.
    pub fn write(&self, artifact: &RenderedArtifact, room: &str, at: &DateTime<Local>) -> Result<PathBuf> {
        let path = self.output_dir.join(artifact_file_name(room, artifact.kind, at));
        write_file(&self.output_dir, &path, &artifact.data)?;
        log::info!("wrote {} ({} bytes)", path.display(), artifact.data.len());
        Ok(path)
    }

    /// Keep a durable copy named after the receipt id. Failures are logged
    /// and reported as `None`; they never fail the caller.
    pub fn backup(&self, artifact: &RenderedArtifact, id: &str, at: &DateTime<Local>) -> Option<PathBuf> {
        let dir = self.backup_dir.as_ref()?;
        let path = dir.join(artifact_file_name(id, artifact.kind, at));
        match write_file(dir, &path, &artifact.data) {
            Ok(()) => {
                log::debug!("backed up {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("backup of {} failed: {}", id, e);
                None
            }
        }
    }

    /// Backups, newest first. A missing directory yields an empty list.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        let Some(dir) = &self.backup_dir else {
            return Ok(Vec::new());
        };
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| storage(dir, e))? {
            let entry = entry.map_err(|e| storage(dir, e))?;
            let meta = entry.metadata().map_err(|e| storage(&entry.path(), e))?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().map_err(|e| storage(&entry.path(), e))?;
            entries.push(BackupEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                modified: DateTime::<Local>::from(modified),
            });
        }
        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(entries)
    }

    /// Bytes of the backup `name`. Names with path components are rejected.
    pub fn read_backup(&self, name: &str) -> Result<Vec<u8>> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::InvalidRequest(format!("invalid backup name {:?}", name)));
        }
        let dir = self
            .backup_dir
            .as_ref()
            .ok_or_else(|| Error::StorageError("backups are disabled".to_string()))?;
        let path = dir.join(name);
        fs::read(&path).map_err(|e| storage(&path, e))
    }
}

fn write_file(dir: &Path, path: &Path, data: &[u8]) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| storage(dir, e))?;
    fs::write(path, data).map_err(|e| storage(path, e))
}

fn storage(path: &Path, err: std::io::Error) -> Error {
    Error::StorageError(format!("{}: {}", path.display(), err))
}
