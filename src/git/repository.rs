use crate::domain::{ChangedLine, DiffStats, LineSign};
use crate::error::Result;
use crate::git::{FileStatus, StatusEntry};
use git2::{
    Commit, DiffFormat, DiffOptions, ErrorCode, IndexAddOption, IndexMatchedPath,
    Repository as Git2Repo, Status, StatusOptions, Tree,
};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Tree of HEAD, or `None` on an unborn branch
    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn diff_against_head(&self, paths: &[String], context_lines: u32) -> Result<git2::Diff<'_>> {
        let tree = self.head_tree()?;

        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines)
            .include_untracked(false)
            .disable_pathspec_match(true);
        for path in paths {
            opts.pathspec(path.as_str());
        }

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))?;
        Ok(diff)
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn classify_status(status: Status) -> Option<FileStatus> {
    if status.is_wt_new() && !status.is_index_new() {
        Some(FileStatus::Untracked)
    } else if status.is_index_deleted() || status.is_wt_deleted() {
        Some(FileStatus::Deleted)
    } else if status.is_index_renamed() || status.is_wt_renamed() {
        Some(FileStatus::Renamed)
    } else if status.is_index_new() {
        Some(FileStatus::Added)
    } else if status.is_index_modified()
        || status.is_wt_modified()
        || status.is_index_typechange()
        || status.is_wt_typechange()
    {
        Some(FileStatus::Modified)
    } else {
        None
    }
}

/// Path of a status entry; renames report their new path
fn entry_path(entry: &git2::StatusEntry<'_>) -> Option<String> {
    let status = entry.status();
    let renamed = if status.is_index_renamed() {
        entry.head_to_index()
    } else if status.is_wt_renamed() {
        entry.index_to_workdir()
    } else {
        None
    };

    renamed
        .and_then(|delta| delta.new_file().path())
        .and_then(|path| path.to_str())
        .or_else(|| entry.path())
        .map(str::to_string)
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn status(&self) -> Result<Vec<StatusEntry>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let entries = statuses
            .iter()
            .filter_map(|entry| {
                let path = entry_path(&entry)?;
                classify_status(entry.status()).map(|status| StatusEntry::new(path, status))
            })
            .collect();

        Ok(entries)
    }

    fn file_diff(&self, path: &str) -> Result<Vec<ChangedLine>> {
        let diff = self.diff_against_head(&[path.to_string()], 0)?;

        let mut lines = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let sign = match line.origin() {
                '+' => LineSign::Added,
                '-' => LineSign::Removed,
                _ => return true,
            };
            let content = String::from_utf8_lossy(line.content());
            lines.push(ChangedLine::new(
                sign,
                content.trim_end_matches(&['\r', '\n'][..]),
            ));
            true
        })?;

        Ok(lines)
    }

    fn diff_stats(&self, paths: &[String]) -> Result<DiffStats> {
        if paths.is_empty() {
            return Ok(DiffStats::default());
        }

        let diff = self.diff_against_head(paths, 3)?;
        let stats = diff.stats()?;

        Ok(DiffStats {
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        Ok(self
            .status()?
            .into_iter()
            .filter(|entry| entry.status == FileStatus::Untracked)
            .map(|entry| entry.path)
            .collect())
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;

        Ok(index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect())
    }

    fn stage_paths(&self, paths: &[String]) -> Result<()> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(Path::new(path))?;
        }
        index.write()?;
        Ok(())
    }

    fn stage_all(&self, excluded: &[String]) -> Result<()> {
        // non-zero skips the path
        let mut skip_excluded = |path: &Path, _spec: &[u8]| -> i32 {
            i32::from(excluded.iter().any(|dir| path.starts_with(dir)))
        };

        let mut index = self.repo.index()?;
        index.add_all(
            ["*"].iter(),
            IndexAddOption::DEFAULT,
            Some(&mut skip_excluded as &mut IndexMatchedPath),
        )?;
        index.update_all(["*"].iter(), Some(&mut skip_excluded as &mut IndexMatchedPath))?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let signature = self.repo.signature()?;

        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(oid.to_string())
    }
}
