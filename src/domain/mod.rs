//! Domain logic - pure rules independent of git and the filesystem

pub mod change;
pub mod version;

pub use change::{
    parse_unified_diff, ChangeMagnitude, ChangedLine, DiffStats, FileChangeVerdict, LineSign,
};
pub use version::{IncrementPolicy, Precision, Version, VersionBump};
