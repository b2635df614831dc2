//! File Rewrite Engine: stamps the new version and date into file contents,
//! plus the project-wide scan that drives it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::backup::BackupSink;
use crate::error::{Result, StamperError};
use crate::git::Repository;
use crate::patterns::PatternRegistry;
use crate::project::ProjectScanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Version { rule: String },
    Date { label: String },
}

/// One replacement on one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// 1-based
    pub line_number: usize,
    pub old_text: String,
    pub new_text: String,
    pub kind: ChangeKind,
}

impl fmt::Display for LineChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} -> {}",
            self.line_number, self.old_text, self.new_text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub content: String,
    pub changes: Vec<LineChange>,
}

impl RewriteOutcome {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// A file the scan rewrote (or would rewrite, in a dry run)
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpdate {
    pub path: String,
    pub changes: Vec<LineChange>,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_updated: usize,
    pub total_replacements: usize,
    pub updates: Vec<FileUpdate>,
    pub failures: Vec<FileFailure>,
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

pub struct RewriteEngine<'a> {
    registry: &'a PatternRegistry,
    version: String,
    date: String,
}

impl<'a> RewriteEngine<'a> {
    /// `date` is already rendered in the project's date format
    pub fn new(
        registry: &'a PatternRegistry,
        version: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        RewriteEngine {
            registry,
            version: version.into(),
            date: date.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Applies every version rule, then every date pattern, line by line.
    /// Line endings are kept as they were.
    pub fn rewrite_content(&self, content: &str) -> RewriteOutcome {
        let mut output = String::with_capacity(content.len() + 16);
        let mut changes = Vec::new();

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let (body, ending) = split_line_ending(raw);
            let line_number = index + 1;
            let mut line = body.to_string();

            for rule in self.registry.version_rules() {
                if !rule.is_match(&line) {
                    continue;
                }
                for (old_text, new_text) in rule.previews(&line, &self.version) {
                    if old_text != new_text {
                        changes.push(LineChange {
                            line_number,
                            old_text,
                            new_text,
                            kind: ChangeKind::Version {
                                rule: rule.name().to_string(),
                            },
                        });
                    }
                }
                line = rule.apply(&line, &self.version).into_owned();
            }

            for pattern in self.registry.date_patterns() {
                if !pattern.is_match(&line) {
                    continue;
                }
                for old_date in pattern.dates(&line) {
                    if old_date != self.date {
                        changes.push(LineChange {
                            line_number,
                            old_text: format!("{}: {}", pattern.label(), old_date),
                            new_text: format!("{}: {}", pattern.label(), self.date),
                            kind: ChangeKind::Date {
                                label: pattern.label().to_string(),
                            },
                        });
                    }
                }
                line = pattern.apply(&line, &self.date).into_owned();
            }

            output.push_str(&line);
            output.push_str(ending);
        }

        if changes.is_empty() {
            output = content.to_string();
        }
        RewriteOutcome {
            content: output,
            changes,
        }
    }

    /// Rewrites one project file. Nothing is written when no line changes;
    /// otherwise the backup sink copies the file first.
    ///
    /// Returns `Ok(None)` for a no-op.
    pub fn rewrite_file(
        &self,
        root: &Path,
        relative: &str,
        backup: Option<&BackupSink>,
        dry_run: bool,
    ) -> Result<Option<FileUpdate>> {
        let path = root.join(relative);
        let content = fs::read_to_string(&path)?;
        let outcome = self.rewrite_content(&content);
        if !outcome.is_changed() {
            return Ok(None);
        }

        if dry_run {
            return Ok(Some(FileUpdate {
                path: relative.to_string(),
                changes: outcome.changes,
                backup: None,
            }));
        }

        let backup_path = match backup {
            Some(sink) => Some(sink.backup_file(relative)?),
            None => None,
        };
        fs::write(&path, &outcome.content)
            .map_err(|e| StamperError::rewrite(format!("cannot write {}: {}", relative, e)))?;

        Ok(Some(FileUpdate {
            path: relative.to_string(),
            changes: outcome.changes,
            backup: backup_path,
        }))
    }

    /// Runs the engine over every project file except `skip_files`.
    ///
    /// A file that cannot be read, backed up or written is recorded as a
    /// failure and the scan moves on.
    pub fn scan_and_update<R: Repository>(
        &self,
        scanner: &ProjectScanner,
        repo: Option<&R>,
        backup: Option<&BackupSink>,
        dry_run: bool,
    ) -> ScanStats {
        let skip = &scanner.config().skip_files;
        let files: Vec<String> = scanner
            .project_files(repo)
            .into_iter()
            .filter(|file| {
                let basename = file.rsplit('/').next().unwrap_or(file);
                !skip.iter().any(|s| s == basename)
            })
            .collect();

        let mut stats = ScanStats::default();
        for file in files {
            stats.files_scanned += 1;
            match self.rewrite_file(scanner.root(), &file, backup, dry_run) {
                Ok(Some(update)) => {
                    debug!("{}: {} replacement(s)", update.path, update.changes.len());
                    stats.files_updated += 1;
                    stats.total_replacements += update.changes.len();
                    stats.updates.push(update);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("skipping {}: {}", file, e);
                    stats.failures.push(FileFailure {
                        path: file,
                        reason: e.to_string(),
                    });
                }
            }
        }
        stats
    }
}
