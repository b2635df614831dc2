//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! Functions here are pure (no I/O side effects beyond printing) and testable.

use console::style;

use crate::analyzer::ChangeReport;
use crate::domain::{ChangeMagnitude, FileChangeVerdict, VersionBump};
use crate::rewrite::ScanStats;
use crate::version_source::VersionOrigin;
use crate::warning::RunWarning;

/// Longest preview line shown before truncation
const PREVIEW_WIDTH: usize = 60;

/// How many rewritten files the report lists by name
const MAX_LISTED_FILES: usize = 10;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a run warning to the user.
pub fn display_warning(warning: &RunWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Cuts `text` to `width` characters, marking the cut with `...`
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width).collect();
        format!("{}...", cut)
    }
}

/// Percentage with one decimal, e.g. `15.0%`
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// Show an untracked file offered for inclusion with its first lines.
pub fn display_new_file(path: &str, preview: &[String]) {
    println!("\n{} {}", style("New file:").bold(), style(path).cyan());
    for line in preview {
        println!("  {}", style(truncate(line, PREVIEW_WIDTH)).dim());
    }
}

/// Display which changed files need a bump and which were only version/date
/// residue.
pub fn display_change_report(report: &ChangeReport) {
    if !report.vcs_available {
        return;
    }

    println!("\n{}", style("Changed files:").bold());
    for file in &report.substantive {
        match &file.verdict {
            FileChangeVerdict::Substantive { first_offending } => println!(
                "  {} {}  {}",
                style("M").yellow(),
                file.path,
                style(truncate(&first_offending.to_string(), PREVIEW_WIDTH)).dim()
            ),
            _ => println!("  {} {}  {}", style("?").red(), file.path, style("(diff unavailable)").dim()),
        }
    }
    for path in &report.trivial {
        println!("  {} {}  {}", style("·").dim(), path, style("(version/date only)").dim());
    }
}

/// Display the change statistics and the bump they lead to.
pub fn display_magnitude(magnitude: &ChangeMagnitude, bump: VersionBump) {
    println!("\n{}", style("Change analysis:").bold());
    println!("  Files changed: {}", magnitude.files_changed);
    println!(
        "  Lines: {} {}",
        style(format!("+{}", magnitude.insertions)).green(),
        style(format!("-{}", magnitude.deletions)).red()
    );
    println!("  Project lines: {}", magnitude.total_project_lines);
    println!(
        "  Change: {} -> {} update",
        format_percentage(magnitude.percentage),
        style(bump).bold()
    );
}

/// Display the current and proposed versions.
pub fn display_proposed_version(current: &str, origin: &VersionOrigin, proposed: &str) {
    println!("\n{}", style("Proposed Version Change:").bold());
    println!("  From: {} ({})", style(current).red(), origin);
    println!("  To:   {}", style(proposed).green());
}

/// Display the outcome of a scan, or what it would do in a dry run.
pub fn display_scan_report(stats: &ScanStats, dry_run: bool) {
    let heading = if dry_run {
        "Dry run - files that would be updated:"
    } else {
        "Update summary:"
    };
    println!("\n{}", style(heading).bold());
    println!("  Files scanned: {}", stats.files_scanned);
    println!("  Files updated: {}", stats.files_updated);
    println!("  Replacements:  {}", stats.total_replacements);

    for update in stats.updates.iter().take(MAX_LISTED_FILES) {
        println!("  {}", style(&update.path).cyan());
        if dry_run {
            for change in &update.changes {
                println!("    {}", style(change).dim());
            }
        }
    }
    if stats.updates.len() > MAX_LISTED_FILES {
        println!("  ... and {} more files", stats.updates.len() - MAX_LISTED_FILES);
    }

    for failure in &stats.failures {
        display_warning(&RunWarning::FileSkipped {
            path: failure.path.clone(),
            reason: failure.reason.clone(),
        });
    }
}
