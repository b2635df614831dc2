use std::path::Path;

use log::{debug, warn};

use crate::analyzer::TrivialityClassifier;
use crate::domain::FileChangeVerdict;
use crate::git::{FileStatus, Repository};
use crate::project::ProjectScanner;

/// A changed file together with the classifier's verdict on it
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFile {
    pub path: String,
    pub verdict: FileChangeVerdict,
}

/// What the working tree says about the need for a bump
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeReport {
    /// False only when the VCS answered and nothing substantive changed
    pub has_changes: bool,
    pub vcs_available: bool,
    /// Substantive and unreadable files, the estimator's candidate set
    pub substantive: Vec<ClassifiedFile>,
    /// Files whose diff is only version/date residue
    pub trivial: Vec<String>,
    /// Files left out by the ignore list or excluded directories
    pub ignored: Vec<String>,
}

impl ChangeReport {
    /// Status could not be read: assume changes exist, with no candidates
    pub fn unavailable() -> Self {
        ChangeReport {
            has_changes: true,
            vcs_available: false,
            substantive: Vec::new(),
            trivial: Vec::new(),
            ignored: Vec::new(),
        }
    }

    pub fn candidate_files(&self) -> Vec<String> {
        self.substantive.iter().map(|f| f.path.clone()).collect()
    }
}

/// Walks the working-tree status and keeps the files that need a bump
pub struct ChangeDetector<'a> {
    scanner: &'a ProjectScanner,
    classifier: TrivialityClassifier<'a>,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(scanner: &'a ProjectScanner, classifier: TrivialityClassifier<'a>) -> Self {
        ChangeDetector {
            scanner,
            classifier,
        }
    }

    fn is_ignored(&self, path: &str) -> bool {
        let basename = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.scanner
            .config()
            .ignore_for_changes
            .iter()
            .any(|ignored| *ignored == basename)
            || self.scanner.is_excluded_path(path)
    }

    pub fn detect<R: Repository>(&self, repo: Option<&R>) -> ChangeReport {
        let Some(repo) = repo else {
            return ChangeReport::unavailable();
        };

        let entries = match repo.status() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read working-tree status: {}", e);
                return ChangeReport::unavailable();
            }
        };

        let mut report = ChangeReport {
            has_changes: false,
            vcs_available: true,
            substantive: Vec::new(),
            trivial: Vec::new(),
            ignored: Vec::new(),
        };

        for entry in entries {
            match entry.status {
                // deletions carry no version text; new files go through inclusion
                FileStatus::Deleted | FileStatus::Untracked => continue,
                _ => {}
            }

            if self.is_ignored(&entry.path) {
                report.ignored.push(entry.path);
                continue;
            }

            let verdict = self.classifier.classify_diff(repo.file_diff(&entry.path));
            match verdict {
                FileChangeVerdict::Trivial => {
                    debug!("ignoring version/date-only update in {}", entry.path);
                    report.trivial.push(entry.path);
                }
                verdict => {
                    if let FileChangeVerdict::Unreadable { reason } = &verdict {
                        warn!("cannot diff {} ({}); treating as changed", entry.path, reason);
                    }
                    report.substantive.push(ClassifiedFile {
                        path: entry.path,
                        verdict,
                    });
                }
            }
        }

        report.has_changes = !report.substantive.is_empty();
        report
    }
}
