//! Version-control query interface
//!
//! The [Repository] trait is everything the stamper needs from version
//! control: working-tree status, zero-context diffs against the last commit,
//! scoped diff statistics, tracked/untracked listings, staging and
//! committing.
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! Callers treat any `Err` as "tool unavailable" and degrade instead of
//! aborting the run.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{ChangedLine, DiffStats};
use crate::error::Result;
use std::path::Path;

/// Working-tree state of a path relative to the last commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

/// One line of working-tree status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    pub status: FileStatus,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        StatusEntry {
            path: path.into(),
            status,
        }
    }
}

/// Common version-control operations
pub trait Repository {
    /// Root of the working tree
    fn workdir(&self) -> Option<&Path>;

    /// Added, modified, deleted, renamed and untracked paths
    fn status(&self) -> Result<Vec<StatusEntry>>;

    /// Changed lines of one file against the last commit (index and
    /// working tree combined, no context lines)
    fn file_diff(&self, path: &str) -> Result<Vec<ChangedLine>>;

    /// Insertion/deletion counts against the last commit, restricted to
    /// `paths`. Never widens to the whole repository.
    fn diff_stats(&self, paths: &[String]) -> Result<DiffStats>;

    /// Files not tracked and not ignored
    fn untracked_files(&self) -> Result<Vec<String>>;

    /// Every path in the index
    fn tracked_files(&self) -> Result<Vec<String>>;

    /// Stage the given paths
    fn stage_paths(&self, paths: &[String]) -> Result<()>;

    /// Stage every change in the working tree, deletions included, except
    /// paths under the `excluded` directories
    fn stage_all(&self, excluded: &[String]) -> Result<()>;

    /// Commit the index on top of HEAD, returning the new commit id
    fn commit(&self, message: &str) -> Result<String>;
}
