//! Backup sink: a full project snapshot before any rewrite, and a copy of
//! each file right before it is overwritten.
//!
//! Layout under the project root, with the default configuration:
//!
//! ```text
//! assets/backups/version-backups/version-backup-<YYYYMMDD-HHMMSS>/...  full snapshot
//! assets/backups/pages-backup/<YYYYMMDD-HHMMSS>/<relative path>       per-file copies
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::debug;
use walkdir::WalkDir;

use crate::config::{BackupConfig, ScanConfig};
use crate::error::{Result, StamperError};

/// Directory stamp for a run, `YYYYMMDD-HHMMSS`
pub fn timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d-%H%M%S").to_string()
}

pub struct BackupSink {
    project_root: PathBuf,
    config: BackupConfig,
    exclude_dirs: Vec<String>,
    exclude_prefixes: Vec<String>,
    stamp: String,
}

impl BackupSink {
    /// `stamp` keys every directory this sink creates during the run
    pub fn new(
        project_root: impl Into<PathBuf>,
        config: BackupConfig,
        scan: &ScanConfig,
        stamp: impl Into<String>,
    ) -> Self {
        BackupSink {
            project_root: project_root.into(),
            config,
            exclude_dirs: scan.exclude_dirs.clone(),
            exclude_prefixes: scan.exclude_prefixes.clone(),
            stamp: stamp.into(),
        }
    }

    pub fn backup_root(&self) -> PathBuf {
        self.project_root.join(&self.config.root)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.backup_root()
            .join(&self.config.snapshot_dir)
            .join(format!("{}-{}", self.config.snapshot_prefix, self.stamp))
    }

    pub fn file_backup_dir(&self) -> PathBuf {
        self.backup_root().join(&self.config.file_dir).join(&self.stamp)
    }

    fn is_skipped(&self, path: &Path) -> bool {
        if path.starts_with(self.backup_root()) {
            return true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.exclude_dirs.iter().any(|d| *d == name)
            || self
                .exclude_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Copies the project tree, minus excluded directories and the backup
    /// root itself, into a fresh snapshot directory
    pub fn snapshot(&self) -> Result<PathBuf> {
        let target = self.snapshot_dir();
        fs::create_dir_all(&target).map_err(|e| {
            StamperError::backup(format!("cannot create {}: {}", target.display(), e))
        })?;

        let walker = WalkDir::new(&self.project_root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry.path()));

        let mut copied = 0usize;
        for entry in walker {
            let entry = entry.map_err(|e| StamperError::backup(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.project_root)
                .map_err(|e| StamperError::backup(e.to_string()))?;
            let dest = target.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest).map_err(|e| {
                StamperError::backup(format!("cannot copy {}: {}", relative.display(), e))
            })?;
            copied += 1;
        }

        debug!("snapshot of {} files in {}", copied, target.display());
        Ok(target)
    }

    /// Copies one file, keeping its project-relative path
    pub fn backup_file(&self, relative: &str) -> Result<PathBuf> {
        let source = self.project_root.join(relative);
        let dest = self.file_backup_dir().join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &dest)
            .map_err(|e| StamperError::backup(format!("cannot copy {}: {}", relative, e)))?;
        Ok(dest)
    }
}
