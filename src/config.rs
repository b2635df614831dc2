use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, StamperError};

/// File name looked up in the project root and in the user config directory.
pub const CONFIG_FILE_NAME: &str = "versionstamper.toml";

/// Represents the complete configuration for version-stamper.
///
/// Built once per run and handed to each component; nothing reads it from
/// global state.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub version_source: VersionSourceConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub patterns: PatternsConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_extensions() -> Vec<String> {
    strings(&["md", "html", "js", "py", "json", "txt", "css"])
}

fn default_exclude_dirs() -> Vec<String> {
    strings(&[
        ".git",
        "node_modules",
        "__pycache__",
        ".agent",
        "venv",
        "env",
        "backups",
        "version_backups",
        "version-backups",
        "pages-backup",
        "pages_backup",
    ])
}

fn default_exclude_prefixes() -> Vec<String> {
    strings(&["backup_", "version_backup_", "version-backup-"])
}

fn default_ignore_for_changes() -> Vec<String> {
    strings(&[
        "README.md",
        "CHANGELOG.md",
        "VERSION_UPDATE_GUIDE.md",
        "LICENSE",
        ".gitignore",
    ])
}

fn default_new_file_extensions() -> Vec<String> {
    strings(&["md"])
}

fn default_true() -> bool {
    true
}

/// Which files take part in scanning, line counting and change detection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanConfig {
    /// Extension allow-list, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names excluded wherever they appear in a path
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Path components starting with any of these are excluded (old backup dirs)
    #[serde(default = "default_exclude_prefixes")]
    pub exclude_prefixes: Vec<String>,

    /// Skip dot-prefixed path components while walking the project
    #[serde(default = "default_true")]
    pub exclude_hidden: bool,

    /// Basenames whose edits never count as code changes
    #[serde(default = "default_ignore_for_changes")]
    pub ignore_for_changes: Vec<String>,

    /// Basenames that are never rewritten
    #[serde(default)]
    pub skip_files: Vec<String>,

    /// Untracked files with these extensions are offered for inclusion
    #[serde(default = "default_new_file_extensions")]
    pub new_file_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_prefixes: default_exclude_prefixes(),
            exclude_hidden: true,
            ignore_for_changes: default_ignore_for_changes(),
            skip_files: Vec::new(),
            new_file_extensions: default_new_file_extensions(),
        }
    }
}

fn default_manifest() -> String {
    "manifest.json".to_string()
}

fn default_entry_file() -> String {
    "index.html".to_string()
}

fn default_fallback_version() -> String {
    "1.0.0".to_string()
}

/// Where the current version is read from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionSourceConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_entry_file")]
    pub entry_file: String,

    #[serde(default = "default_fallback_version")]
    pub fallback: String,
}

impl Default for VersionSourceConfig {
    fn default() -> Self {
        VersionSourceConfig {
            manifest: default_manifest(),
            entry_file: default_entry_file(),
            fallback: default_fallback_version(),
        }
    }
}

fn default_major_threshold() -> f64 {
    50.0
}

fn default_minor_threshold() -> f64 {
    10.0
}

/// Change-percentage thresholds for the increment policy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ThresholdConfig {
    #[serde(default = "default_major_threshold")]
    pub major: f64,

    #[serde(default = "default_minor_threshold")]
    pub minor: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            major: default_major_threshold(),
            minor: default_minor_threshold(),
        }
    }
}

fn default_backup_root() -> String {
    "assets/backups".to_string()
}

fn default_snapshot_dir() -> String {
    "version-backups".to_string()
}

fn default_snapshot_prefix() -> String {
    "version-backup".to_string()
}

fn default_file_dir() -> String {
    "pages-backup".to_string()
}

/// Backup sink layout, relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BackupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_backup_root")]
    pub root: String,

    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,

    #[serde(default = "default_snapshot_prefix")]
    pub snapshot_prefix: String,

    #[serde(default = "default_file_dir")]
    pub file_dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            enabled: true,
            root: default_backup_root(),
            snapshot_dir: default_snapshot_dir(),
            snapshot_prefix: default_snapshot_prefix(),
            file_dir: default_file_dir(),
        }
    }
}

fn default_date_format() -> String {
    "%B %d, %Y".to_string()
}

/// Date rendering and user-supplied version patterns.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatternsConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub extra: Vec<ExtraPattern>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        PatternsConfig {
            date_format: default_date_format(),
            extra: Vec::new(),
        }
    }
}

/// A project-specific version pattern appended after the built-in rules.
///
/// `pattern` must capture the version digits as group 2; `template` may use
/// `${1}`, `${3}` and the `{version}` placeholder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtraPattern {
    pub name: String,
    pub pattern: String,
    pub template: String,
}

fn default_commit_message() -> String {
    "chore: update version to {version}".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            commit_message: default_commit_message(),
        }
    }
}

impl Config {
    /// Rejects settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.minor >= 0.0 && t.major >= 0.0) {
            return Err(StamperError::config(
                "thresholds must be non-negative numbers",
            ));
        }
        if t.minor > t.major {
            return Err(StamperError::config(format!(
                "minor threshold ({}) exceeds major threshold ({})",
                t.minor, t.major
            )));
        }
        if self.scan.extensions.is_empty() {
            return Err(StamperError::config("scan.extensions must not be empty"));
        }
        if StrftimeItems::new(&self.patterns.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(StamperError::config(format!(
                "patterns.date_format '{}' is not a valid date format",
                self.patterns.date_format
            )));
        }
        if !self.git.commit_message.contains("{version}") {
            return Err(StamperError::config(
                "git.commit_message must contain a {version} placeholder",
            ));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versionstamper.toml` in the project root
/// 3. `versionstamper.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration, already validated
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>, project_root: &Path) -> Result<Config> {
    let local = project_root.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| StamperError::config(format!("cannot read '{}': {}", path, e)))?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(CONFIG_FILE_NAME);
        if user_config.exists() {
            fs::read_to_string(user_config)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| StamperError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
