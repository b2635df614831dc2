use std::fmt;

/// Side of a diff a changed line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSign {
    Added,
    Removed,
}

impl LineSign {
    pub fn symbol(&self) -> char {
        match self {
            LineSign::Added => '+',
            LineSign::Removed => '-',
        }
    }
}

/// One added or removed line of a text diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    pub sign: LineSign,
    pub content: String,
}

impl ChangedLine {
    pub fn new(sign: LineSign, content: impl Into<String>) -> Self {
        ChangedLine {
            sign,
            content: content.into(),
        }
    }

    pub fn added(content: impl Into<String>) -> Self {
        ChangedLine::new(LineSign::Added, content)
    }

    pub fn removed(content: impl Into<String>) -> Self {
        ChangedLine::new(LineSign::Removed, content)
    }

    /// Reads one line of unified diff output.
    ///
    /// Returns `None` for context lines, hunk headers and the `+++`/`---`
    /// file headers.
    pub fn from_diff_line(line: &str) -> Option<Self> {
        if line.starts_with("+++") || line.starts_with("---") {
            return None;
        }
        if let Some(rest) = line.strip_prefix('+') {
            Some(ChangedLine::added(rest))
        } else {
            line.strip_prefix('-').map(ChangedLine::removed)
        }
    }
}

impl fmt::Display for ChangedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign.symbol(), self.content)
    }
}

/// Extracts the changed lines from raw unified diff text
pub fn parse_unified_diff(diff: &str) -> Vec<ChangedLine> {
    diff.lines().filter_map(ChangedLine::from_diff_line).collect()
}

/// Verdict of the triviality classifier for a single file
#[derive(Debug, Clone, PartialEq)]
pub enum FileChangeVerdict {
    /// Every changed line is a version or date line (or there are none)
    Trivial,
    /// At least one changed line is a real edit; the first one found is kept
    Substantive { first_offending: ChangedLine },
    /// The diff could not be obtained
    Unreadable { reason: String },
}

impl FileChangeVerdict {
    pub fn is_trivial(&self) -> bool {
        matches!(self, FileChangeVerdict::Trivial)
    }

    /// Unreadable counts as a real change: when in doubt, bump.
    pub fn requires_bump(&self) -> bool {
        !self.is_trivial()
    }
}

/// Insertion/deletion counts reported by the VCS for a set of paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// How much of the project a change touched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChangeMagnitude {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub total_project_lines: usize,
    pub percentage: f64,
}

impl ChangeMagnitude {
    pub fn zero() -> Self {
        ChangeMagnitude::default()
    }

    /// Percentage is `(insertions + deletions) / total_project_lines * 100`,
    /// or 0 for an empty project. No upper cap.
    pub fn from_stats(stats: DiffStats, total_project_lines: usize) -> Self {
        let total_changes = stats.insertions + stats.deletions;
        let percentage = if total_project_lines > 0 {
            total_changes as f64 / total_project_lines as f64 * 100.0
        } else {
            0.0
        };

        ChangeMagnitude {
            files_changed: stats.files_changed,
            insertions: stats.insertions,
            deletions: stats.deletions,
            total_project_lines,
            percentage,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.insertions + self.deletions
    }
}
