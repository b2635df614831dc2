//! Current-version detection: manifest first, then the entry file, then the
//! configured fallback.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::config::VersionSourceConfig;
use crate::error::Result;

/// Where the current version came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOrigin {
    Manifest(PathBuf),
    EntryFile(PathBuf),
    Fallback,
}

impl fmt::Display for VersionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOrigin::Manifest(path) | VersionOrigin::EntryFile(path) => {
                write!(f, "{}", path.display())
            }
            VersionOrigin::Fallback => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentVersion {
    /// As written in the source, not normalized
    pub value: String,
    pub origin: VersionOrigin,
}

/// Top-level `version` string of a JSON manifest
pub fn read_manifest_version(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    let manifest: Value = serde_json::from_str(&content)?;
    Ok(manifest
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// First `Version: X.Y[.Z]` in an entry file
pub fn read_entry_file_version(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    let re = Regex::new(r"Version:?\s*([0-9]+\.[0-9]+(?:\.[0-9]+)?)")?;
    Ok(re
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Never fails: unreadable sources fall through to the next one
pub fn detect_current_version(root: &Path, config: &VersionSourceConfig) -> CurrentVersion {
    let manifest = root.join(&config.manifest);
    if manifest.is_file() {
        match read_manifest_version(&manifest) {
            Ok(Some(value)) => {
                return CurrentVersion {
                    value,
                    origin: VersionOrigin::Manifest(PathBuf::from(&config.manifest)),
                }
            }
            Ok(None) => debug!("{} has no version field", manifest.display()),
            Err(e) => debug!("cannot read {}: {}", manifest.display(), e),
        }
    }

    let entry = root.join(&config.entry_file);
    if entry.is_file() {
        match read_entry_file_version(&entry) {
            Ok(Some(value)) => {
                return CurrentVersion {
                    value,
                    origin: VersionOrigin::EntryFile(PathBuf::from(&config.entry_file)),
                }
            }
            Ok(None) => debug!("no version marker in {}", entry.display()),
            Err(e) => debug!("cannot read {}: {}", entry.display(), e),
        }
    }

    CurrentVersion {
        value: config.fallback.clone(),
        origin: VersionOrigin::Fallback,
    }
}
