//! Main workflow orchestration logic
//!
//! Sequences one stamping run: new-file inclusion, change detection,
//! magnitude, increment policy, version choice, backup, rewrite, report and
//! the optional commit. It is kept apart from `main.rs` so that a run can be
//! driven programmatically with any [`Repository`] and [`Prompter`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{debug, info};

use crate::analyzer::{ChangeDetector, MagnitudeEstimator, TrivialityClassifier};
use crate::backup::{self, BackupSink};
use crate::config::Config;
use crate::domain::{ChangeMagnitude, IncrementPolicy, Version, VersionBump};
use crate::git::Repository;
use crate::patterns::PatternRegistry;
use crate::project::ProjectScanner;
use crate::rewrite::{RewriteEngine, ScanStats};
use crate::ui::{self, parse_version_choice, validate_version_input, Prompter, VersionChoice};
use crate::version_source::detect_current_version;
use crate::warning::RunWarning;

/// Comment placed above paths the user declined to include
pub const GITIGNORE_MARKER: &str = "# Excluded by version-stamper";

/// Lines of an untracked file shown when offering it
const PREVIEW_LINES: usize = 3;

/// Arguments for the stamping workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
/// This decoupling allows the workflow to be called programmatically
/// without depending on clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StampWorkflowArgs {
    /// Update even when no substantive change is found
    pub force: bool,

    /// Preview mode - no backup, no writes, no commit
    pub dry_run: bool,

    /// Manual version, validated before anything is touched
    pub set_version: Option<String>,

    /// Commit without asking
    pub commit: bool,
}

/// What a run did (or, in a dry run, would do)
#[derive(Debug, Clone, PartialEq)]
pub struct StampReport {
    pub old_version: String,
    pub new_version: String,
    pub bump: VersionBump,
    pub magnitude: ChangeMagnitude,
    pub stats: ScanStats,
    /// Full project snapshot taken before the rewrite
    pub snapshot: Option<PathBuf>,
    /// Id of the version commit
    pub commit: Option<String>,
    pub warnings: Vec<RunWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Nothing substantive changed and no update was forced
    NoChanges,
    /// The user declined at a prompt
    Cancelled,
    DryRun(StampReport),
    Updated(StampReport),
}

fn warn_user(warnings: &mut Vec<RunWarning>, warning: RunWarning) {
    ui::display_warning(&warning);
    warnings.push(warning);
}

/// First lines of a file for the inclusion prompt; empty when unreadable
fn preview_lines(path: &Path, count: usize) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().take(count).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Appends `paths` to `.gitignore` under [`GITIGNORE_MARKER`], skipping
/// paths already listed. Returns the paths actually added.
pub fn append_to_gitignore(root: &Path, paths: &[String]) -> crate::Result<Vec<String>> {
    let gitignore = root.join(".gitignore");
    let existing = if gitignore.exists() {
        fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    let missing: Vec<String> = paths
        .iter()
        .filter(|path| !existing.lines().any(|line| line.trim() == path.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(missing);
    }

    let mut content = existing.clone();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    if !existing.lines().any(|line| line.trim() == GITIGNORE_MARKER) {
        content.push_str(GITIGNORE_MARKER);
        content.push('\n');
    }
    for path in &missing {
        content.push_str(path);
        content.push('\n');
    }
    fs::write(&gitignore, content)?;
    Ok(missing)
}

/// Offers untracked files with a configured extension for inclusion.
/// Accepted files are staged, declined ones go to `.gitignore`.
fn include_new_files<R: Repository, P: Prompter>(
    repo: &R,
    scanner: &ProjectScanner,
    prompter: &mut P,
    warnings: &mut Vec<RunWarning>,
) -> Result<()> {
    let untracked = match repo.untracked_files() {
        Ok(files) => files,
        Err(e) => {
            warn_user(
                warnings,
                RunWarning::VcsUnavailable {
                    operation: "listing new files".to_string(),
                    reason: e.to_string(),
                },
            );
            return Ok(());
        }
    };

    let extensions = &scanner.config().new_file_extensions;
    let candidates: Vec<String> = untracked
        .into_iter()
        .filter(|path| !scanner.is_excluded_path(path))
        .filter(|path| {
            Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|allowed| allowed == ext))
                .unwrap_or(false)
        })
        .collect();

    let mut accepted = Vec::new();
    let mut declined = Vec::new();
    for path in candidates {
        let preview = preview_lines(&scanner.root().join(&path), PREVIEW_LINES);
        if prompter.include_new_file(&path, &preview)? {
            accepted.push(path);
        } else {
            declined.push(path);
        }
    }

    if !accepted.is_empty() {
        match repo.stage_paths(&accepted) {
            Ok(()) => ui::display_success(&format!("Staged {} new file(s)", accepted.len())),
            Err(e) => warn_user(
                warnings,
                RunWarning::VcsUnavailable {
                    operation: "staging new files".to_string(),
                    reason: e.to_string(),
                },
            ),
        }
    }
    if !declined.is_empty() {
        let added = append_to_gitignore(scanner.root(), &declined)
            .context("could not update .gitignore")?;
        debug!("added {} path(s) to .gitignore", added.len());
    }
    Ok(())
}

/// Asks for confirmation when the chosen version is not above the current one
fn confirm_version_order<P: Prompter>(
    current: &str,
    chosen: &str,
    prompter: &mut P,
    warnings: &mut Vec<RunWarning>,
) -> Result<bool> {
    // unparsable versions cannot be ordered
    let (Ok(current_version), Ok(chosen_version)) =
        (Version::parse(current), Version::parse(chosen))
    else {
        return Ok(true);
    };

    let current_semver = current_version.to_semver();
    let chosen_semver = chosen_version.to_semver();
    if chosen_semver == current_semver {
        warn_user(
            warnings,
            RunWarning::SameVersion {
                version: chosen.to_string(),
            },
        );
        prompter.confirm("Keep the same version anyway?", false)
    } else if chosen_semver < current_semver {
        warn_user(
            warnings,
            RunWarning::Downgrade {
                current: current.to_string(),
                requested: chosen.to_string(),
            },
        );
        prompter.confirm("Downgrade anyway?", false)
    } else {
        Ok(true)
    }
}

/// Main stamping workflow
///
/// Orchestrates the entire run:
/// 1. Validate a manual version, if one was given
/// 2. Offer untracked files for inclusion (interactive runs only)
/// 3. Detect substantive changes; stop unless there are some or the run is forced
/// 4. Measure the change and pick the increment
/// 5. Let the user accept, override or cancel the proposed version
/// 6. Back up the project, rewrite every file and report
/// 7. Optionally stage everything and commit
///
/// # Arguments
///
/// * `args` - Workflow arguments (force, dry_run, set_version, commit)
/// * `config` - Validated configuration
/// * `root` - Project root
/// * `now` - The run's clock, used for the rewritten date and backup stamps
/// * `repo` - Version control, or `None` to run without it
/// * `prompter` - Where questions go
///
/// # Returns
///
/// The outcome of the run, or an error if it had to abort
pub fn run_stamp_workflow<R: Repository, P: Prompter>(
    args: &StampWorkflowArgs,
    config: &Config,
    root: &Path,
    now: DateTime<Local>,
    repo: Option<&R>,
    prompter: &mut P,
) -> Result<WorkflowOutcome> {
    // A malformed manual version aborts before anything is written
    if let Some(version) = &args.set_version {
        validate_version_input(version)?;
    }

    let registry = PatternRegistry::from_config(&config.patterns)?;
    let scanner = ProjectScanner::new(root, config.scan.clone());
    let mut warnings = Vec::new();

    if let Some(repo) = repo {
        if prompter.is_interactive() && !args.dry_run {
            include_new_files(repo, &scanner, prompter, &mut warnings)?;
        }
    }

    ui::display_status("Checking for code changes...");
    let detector = ChangeDetector::new(&scanner, TrivialityClassifier::new(&registry));
    let report = detector.detect(repo);
    if repo.is_some() && !report.vcs_available {
        warn_user(
            &mut warnings,
            RunWarning::VcsUnavailable {
                operation: "change detection".to_string(),
                reason: "status could not be read".to_string(),
            },
        );
    }
    ui::display_change_report(&report);

    if !report.has_changes {
        warn_user(&mut warnings, RunWarning::NoSubstantiveChanges);
        if !args.force && !prompter.confirm("Update the version anyway?", false)? {
            return Ok(WorkflowOutcome::NoChanges);
        }
    }

    let magnitude = MagnitudeEstimator::new(&scanner).estimate(repo, &report.candidate_files());
    let bump = IncrementPolicy::from_config(&config.thresholds).decide(magnitude.percentage);
    ui::display_magnitude(&magnitude, bump);

    let current = detect_current_version(root, &config.version_source);
    let base = match Version::parse(&current.value) {
        Ok(version) => version,
        Err(_) => {
            warn_user(
                &mut warnings,
                RunWarning::UnparsableVersion {
                    value: current.value.clone(),
                    fallback: config.version_source.fallback.clone(),
                },
            );
            Version::parse(&config.version_source.fallback)
                .unwrap_or_else(|_| Version::new(1, 0, 0))
        }
    };
    let proposed = base.bump(bump)?.to_string();
    ui::display_proposed_version(&current.value, &current.origin, &proposed);

    let choice = match &args.set_version {
        Some(version) => VersionChoice::Override(version.clone()),
        None => parse_version_choice(&prompter.version_input(&current.value, &proposed)?)?,
    };
    let new_version = match choice {
        VersionChoice::Accept => proposed,
        VersionChoice::Override(version) => version,
        VersionChoice::Cancel => return Ok(WorkflowOutcome::Cancelled),
    };
    if !confirm_version_order(&current.value, &new_version, prompter, &mut warnings)? {
        return Ok(WorkflowOutcome::Cancelled);
    }

    let date = now.format(&config.patterns.date_format).to_string();
    let engine = RewriteEngine::new(&registry, new_version.clone(), date);

    if args.dry_run {
        let stats = engine.scan_and_update(&scanner, repo, None, true);
        ui::display_scan_report(&stats, true);
        return Ok(WorkflowOutcome::DryRun(StampReport {
            old_version: current.value,
            new_version,
            bump,
            magnitude,
            stats,
            snapshot: None,
            commit: None,
            warnings,
        }));
    }

    let sink = config.backup.enabled.then(|| {
        BackupSink::new(
            root,
            config.backup.clone(),
            &config.scan,
            backup::timestamp(&now),
        )
    });
    let snapshot = match &sink {
        Some(sink) => {
            ui::display_status("Creating backup...");
            let path = sink
                .snapshot()
                .context("could not back up the project before rewriting")?;
            ui::display_success(&format!("Backup created: {}", path.display()));
            Some(path)
        }
        None => None,
    };

    ui::display_status(&format!("Updating files to version {}...", new_version));
    let stats = engine.scan_and_update(&scanner, repo, sink.as_ref(), false);
    ui::display_scan_report(&stats, false);
    for failure in &stats.failures {
        warnings.push(RunWarning::FileSkipped {
            path: failure.path.clone(),
            reason: failure.reason.clone(),
        });
    }

    let commit = commit_update(args, config, &new_version, &stats, repo, prompter, &mut warnings)?;

    ui::display_success(&format!(
        "Version updated: {} -> {}",
        current.value, new_version
    ));
    info!(
        "{} file(s) updated, {} replacement(s)",
        stats.files_updated, stats.total_replacements
    );

    Ok(WorkflowOutcome::Updated(StampReport {
        old_version: current.value,
        new_version,
        bump,
        magnitude,
        stats,
        snapshot,
        commit,
        warnings,
    }))
}

fn commit_update<R: Repository, P: Prompter>(
    args: &StampWorkflowArgs,
    config: &Config,
    new_version: &str,
    stats: &ScanStats,
    repo: Option<&R>,
    prompter: &mut P,
    warnings: &mut Vec<RunWarning>,
) -> Result<Option<String>> {
    let Some(repo) = repo else {
        if args.commit {
            warn_user(
                warnings,
                RunWarning::VcsUnavailable {
                    operation: "commit".to_string(),
                    reason: "no repository".to_string(),
                },
            );
        }
        return Ok(None);
    };

    let should_commit = args.commit
        || (stats.files_updated > 0 && prompter.confirm("Commit the version update?", false)?);
    if !should_commit {
        return Ok(None);
    }

    let message = config.git.commit_message.replace("{version}", new_version);
    let excluded = [config.backup.root.clone()];
    match repo.stage_all(&excluded).and_then(|_| repo.commit(&message)) {
        Ok(id) => {
            let short = id.get(..7).unwrap_or(&id);
            ui::display_success(&format!("Committed {}: {}", short, message));
            Ok(Some(id))
        }
        Err(e) => {
            warn_user(
                warnings,
                RunWarning::VcsUnavailable {
                    operation: "commit".to_string(),
                    reason: e.to_string(),
                },
            );
            Ok(None)
        }
    }
}
