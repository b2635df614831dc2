use std::fmt;

/// Non-fatal issues met during a run. They are reported to the user and the
/// run carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum RunWarning {
    /// Every changed file was version/date residue, or nothing changed
    NoSubstantiveChanges,
    /// A version-control query failed; the run proceeds without it
    VcsUnavailable { operation: String, reason: String },
    /// The detected current version cannot be bumped
    UnparsableVersion { value: String, fallback: String },
    /// The chosen version equals the current one
    SameVersion { version: String },
    /// The chosen version is lower than the current one
    Downgrade { current: String, requested: String },
    /// A file could not be read, backed up or written
    FileSkipped { path: String, reason: String },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::NoSubstantiveChanges => {
                write!(f, "No code changes detected since the last commit")
            }
            RunWarning::VcsUnavailable { operation, reason } => {
                write!(
                    f,
                    "Git unavailable for {} ({}); continuing without it",
                    operation, reason
                )
            }
            RunWarning::UnparsableVersion { value, fallback } => {
                write!(
                    f,
                    "Cannot parse current version '{}'; using '{}' as the base",
                    value, fallback
                )
            }
            RunWarning::SameVersion { version } => {
                write!(f, "Version {} is the same as the current version", version)
            }
            RunWarning::Downgrade { current, requested } => {
                write!(
                    f,
                    "Version {} is lower than the current version {}",
                    requested, current
                )
            }
            RunWarning::FileSkipped { path, reason } => {
                write!(f, "Skipped '{}': {}", path, reason)
            }
        }
    }
}
