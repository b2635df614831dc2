use crate::domain::{parse_unified_diff, ChangedLine, DiffStats};
use crate::error::{Result, StamperError};
use crate::git::{FileStatus, Repository, StatusEntry};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    workdir: Option<PathBuf>,
    status: Vec<StatusEntry>,
    diffs: HashMap<String, String>,
    stats: HashMap<String, (usize, usize)>,
    tracked: Vec<String>,
    unavailable: bool,
    staged: RefCell<Vec<String>>,
    commits: RefCell<Vec<String>>,
    diff_stats_calls: Cell<usize>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            workdir: None,
            status: Vec::new(),
            diffs: HashMap::new(),
            stats: HashMap::new(),
            tracked: Vec::new(),
            unavailable: false,
            staged: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
            diff_stats_calls: Cell::new(0),
        }
    }

    pub fn with_workdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    /// Every query fails, as when git is missing or the tree is not a repository
    pub fn set_unavailable(&mut self) {
        self.unavailable = true;
    }

    pub fn add_status(&mut self, path: impl Into<String>, status: FileStatus) {
        self.status.push(StatusEntry::new(path, status));
    }

    /// Register a raw unified diff for a path. Paths without one diff as
    /// unreadable.
    pub fn set_diff(&mut self, path: impl Into<String>, diff: impl Into<String>) {
        self.diffs.insert(path.into(), diff.into());
    }

    pub fn set_line_counts(&mut self, path: impl Into<String>, insertions: usize, deletions: usize) {
        self.stats.insert(path.into(), (insertions, deletions));
    }

    pub fn add_tracked(&mut self, path: impl Into<String>) {
        self.tracked.push(path.into());
    }

    pub fn staged(&self) -> Vec<String> {
        self.staged.borrow().clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }

    pub fn diff_stats_calls(&self) -> usize {
        self.diff_stats_calls.get()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(StamperError::Git(git2::Error::from_str(
                "git is not available",
            )))
        } else {
            Ok(())
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn status(&self) -> Result<Vec<StatusEntry>> {
        self.check_available()?;
        Ok(self.status.clone())
    }

    fn file_diff(&self, path: &str) -> Result<Vec<ChangedLine>> {
        self.check_available()?;
        self.diffs
            .get(path)
            .map(|raw| parse_unified_diff(raw))
            .ok_or_else(|| StamperError::Git(git2::Error::from_str("no diff recorded")))
    }

    fn diff_stats(&self, paths: &[String]) -> Result<DiffStats> {
        self.diff_stats_calls.set(self.diff_stats_calls.get() + 1);
        self.check_available()?;

        let mut stats = DiffStats::default();
        for path in paths {
            if let Some((insertions, deletions)) = self.stats.get(path) {
                stats.files_changed += 1;
                stats.insertions += insertions;
                stats.deletions += deletions;
            }
        }
        Ok(stats)
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .status
            .iter()
            .filter(|entry| entry.status == FileStatus::Untracked)
            .map(|entry| entry.path.clone())
            .collect())
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.tracked.clone())
    }

    fn stage_paths(&self, paths: &[String]) -> Result<()> {
        self.check_available()?;
        self.staged.borrow_mut().extend(paths.iter().cloned());
        Ok(())
    }

    fn stage_all(&self, excluded: &[String]) -> Result<()> {
        self.check_available()?;
        let mut staged = self.staged.borrow_mut();
        staged.push("*".to_string());
        staged.extend(excluded.iter().map(|dir| format!(":!{}", dir)));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.check_available()?;
        let mut commits = self.commits.borrow_mut();
        commits.push(message.to_string());
        Ok(format!("{:040x}", commits.len()))
    }
}
