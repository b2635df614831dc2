//! Project tree walking: which files are scanned, rewritten and counted.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::git::Repository;

/// Walks the project root with the configured allow-list and exclusions
#[derive(Debug, Clone)]
pub struct ProjectScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl ProjectScanner {
    pub fn new(root: impl Into<PathBuf>, config: ScanConfig) -> Self {
        ProjectScanner {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn is_excluded_name(&self, name: &str, hidden_counts: bool) -> bool {
        (hidden_counts && self.config.exclude_hidden && name.starts_with('.'))
            || self.config.exclude_dirs.iter().any(|d| d == name)
            || self
                .config
                .exclude_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// True when any directory component of `relative` is excluded
    pub fn is_excluded_path(&self, relative: &str) -> bool {
        let path = Path::new(relative);
        let components: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        match components.split_last() {
            Some((_file, dirs)) => dirs.iter().any(|dir| self.is_excluded_name(dir, false)),
            None => false,
        }
    }

    pub fn has_scanned_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !self.is_excluded_name(&name, true)
    }

    /// Every non-excluded file with an allowed extension, as `/`-separated
    /// paths relative to the root, sorted
    pub fn walk(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping unreadable path: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.has_scanned_extension(entry.path()))
            .filter_map(|entry| relative_slash_path(&self.root, entry.path()))
            .collect();
        files.sort();
        files
    }

    /// Walked files restricted to those the repository tracks.
    ///
    /// Without a usable repository every walked file counts.
    pub fn project_files<R: Repository>(&self, repo: Option<&R>) -> Vec<String> {
        let walked = self.walk();
        let Some(repo) = repo else {
            return walked;
        };

        match repo.tracked_files() {
            Ok(tracked) => {
                let tracked: HashSet<String> = tracked.into_iter().collect();
                walked
                    .into_iter()
                    .filter(|path| tracked.contains(path))
                    .collect()
            }
            Err(e) => {
                log::warn!("cannot list tracked files ({}); using every scanned file", e);
                walked
            }
        }
    }

    /// Sum of line counts; unreadable or non-UTF-8 files are skipped
    pub fn count_lines(&self, files: &[String]) -> usize {
        files
            .iter()
            .filter_map(|file| match fs::read_to_string(self.root.join(file)) {
                Ok(content) => Some(content.lines().count()),
                Err(e) => {
                    debug!("not counting {}: {}", file, e);
                    None
                }
            })
            .sum()
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
