// tests/workflow_test.rs
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;
use version_stamper::cli::{run_stamp_workflow, StampWorkflowArgs, WorkflowOutcome};
use version_stamper::config::Config;
use version_stamper::domain::VersionBump;
use version_stamper::git::{FileStatus, Git2Repository, MockRepository, Repository};
use version_stamper::ui::{NonInteractivePrompter, Prompter};
use version_stamper::warning::RunWarning;

/// Prompter fed from queues; an empty queue answers with the default
#[derive(Default)]
struct ScriptedPrompter {
    confirms: VecDeque<bool>,
    includes: VecDeque<bool>,
    versions: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    fn versions(answers: &[&str]) -> Self {
        ScriptedPrompter {
            versions: answers.iter().map(|a| a.to_string()).collect(),
            ..ScriptedPrompter::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        self.asked.push(prompt.to_string());
        Ok(self.confirms.pop_front().unwrap_or(default))
    }

    fn include_new_file(&mut self, path: &str, preview: &[String]) -> anyhow::Result<bool> {
        self.asked.push(format!("include {} ({} lines)", path, preview.len()));
        Ok(self.includes.pop_front().unwrap_or(false))
    }

    fn version_input(&mut self, _current: &str, proposed: &str) -> anyhow::Result<String> {
        self.asked.push(format!("version {}", proposed));
        Ok(self.versions.pop_front().unwrap_or_default())
    }
}

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

fn manifest(version: &str) -> String {
    format!("{{\n  \"name\": \"site\",\n  \"version\": \"{}\"\n}}\n", version)
}

/// 1000 tracked lines: manifest.json (4), app.js (596), styles.css (400)
fn thousand_line_project(version: &str) -> (TempDir, MockRepository) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", &manifest(version));
    let mut app = format!("// Version: {}\n", version);
    app.push_str(&"let x = 1;\n".repeat(595));
    write(root, "app.js", &app);
    write(root, "styles.css", &"a { color: red; }\n".repeat(400));

    let mut repo = MockRepository::new().with_workdir(root);
    for file in ["manifest.json", "app.js", "styles.css"] {
        repo.add_tracked(file);
    }
    repo.add_status("app.js", FileStatus::Modified);
    repo.set_diff("app.js", "@@ -2 +2 @@\n-let x = 1;\n+let x = 2;\n");
    (dir, repo)
}

fn run(
    args: &StampWorkflowArgs,
    root: &Path,
    repo: &MockRepository,
    prompter: &mut ScriptedPrompter,
) -> anyhow::Result<WorkflowOutcome> {
    run_stamp_workflow(args, &Config::default(), root, now(), Some(repo), prompter)
}

fn updated(outcome: WorkflowOutcome) -> version_stamper::cli::StampReport {
    match outcome {
        WorkflowOutcome::Updated(report) => report,
        other => panic!("expected an update, got {:?}", other),
    }
}

#[test]
fn test_date_only_readme_edit_needs_no_bump() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", &manifest("3.3"));
    write(root, "README.md", "# Site\n\nLast Updated: October 18, 2026\n");

    let mut repo = MockRepository::new();
    repo.add_tracked("README.md");
    repo.add_tracked("manifest.json");
    repo.add_status("README.md", FileStatus::Modified);
    repo.set_diff(
        "README.md",
        "@@ -3 +3 @@\n-Last Updated: December 12, 2025\n+Last Updated: October 18, 2026\n",
    );

    let mut prompter = ScriptedPrompter::default();
    let outcome = run(&StampWorkflowArgs::default(), root, &repo, &mut prompter).unwrap();

    assert_eq!(outcome, WorkflowOutcome::NoChanges);
    assert_eq!(prompter.asked, vec!["Update the version anyway?"]);
    assert_eq!(read(root, "manifest.json"), manifest("3.3"));
    assert!(!root.join("assets/backups").exists());
    assert_eq!(repo.diff_stats_calls(), 0);
}

#[test]
fn test_forced_update_without_changes_is_a_patch() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", &manifest("3.3"));

    let mut repo = MockRepository::new();
    repo.add_tracked("manifest.json");

    let args = StampWorkflowArgs {
        force: true,
        ..StampWorkflowArgs::default()
    };
    let report = updated(run(&args, root, &repo, &mut ScriptedPrompter::default()).unwrap());

    assert_eq!(report.bump, VersionBump::Patch);
    assert_eq!(report.new_version, "3.3.1");
    assert!(report.warnings.contains(&RunWarning::NoSubstantiveChanges));
    assert_eq!(read(root, "manifest.json"), manifest("3.3.1"));
}

#[test]
fn test_small_change_bumps_patch() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();

    let mut prompter = ScriptedPrompter::default();
    let report = updated(run(&StampWorkflowArgs::default(), root, &repo, &mut prompter).unwrap());

    assert!((report.magnitude.percentage - 1.5).abs() < 1e-9);
    assert_eq!(report.bump, VersionBump::Patch);
    assert_eq!(report.old_version, "3.3.0");
    assert_eq!(report.new_version, "3.3.1");
    assert!(read(root, "app.js").starts_with("// Version: 3.3.1\n"));
    assert_eq!(read(root, "manifest.json"), manifest("3.3.1"));
    assert_eq!(report.stats.files_updated, 2);

    let snapshot = report.snapshot.unwrap();
    assert!(snapshot.ends_with("version-backup-20261018-093000"));
    assert_eq!(
        fs::read_to_string(snapshot.join("manifest.json")).unwrap(),
        manifest("3.3.0")
    );
    assert!(root
        .join("assets/backups/pages-backup/20261018-093000/app.js")
        .is_file());
}

#[test]
fn test_moderate_change_bumps_minor() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 120, 30);

    let report = updated(
        run(
            &StampWorkflowArgs::default(),
            dir.path(),
            &repo,
            &mut ScriptedPrompter::default(),
        )
        .unwrap(),
    );
    assert!((report.magnitude.percentage - 15.0).abs() < 1e-9);
    assert_eq!(report.bump, VersionBump::Minor);
    assert_eq!(report.new_version, "3.4.0");
}

#[test]
fn test_large_change_bumps_major() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 400, 100);
    repo.set_line_counts("styles.css", 100, 0);
    repo.add_status("styles.css", FileStatus::Modified);
    repo.set_diff("styles.css", "@@ -1 +1 @@\n-a { color: red; }\n+a { color: blue; }\n");

    let report = updated(
        run(
            &StampWorkflowArgs::default(),
            dir.path(),
            &repo,
            &mut ScriptedPrompter::default(),
        )
        .unwrap(),
    );
    assert!((report.magnitude.percentage - 60.0).abs() < 1e-9);
    assert_eq!(report.bump, VersionBump::Major);
    assert_eq!(report.new_version, "4.0.0");
}

#[test]
fn test_trivial_files_do_not_inflate_the_magnitude() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);
    // a previous stamp left a big version-only diff behind
    repo.add_status("styles.css", FileStatus::Modified);
    repo.set_diff("styles.css", "@@ -1 +1 @@\n-/* Version: 3.2 */\n+/* Version: 3.3.0 */\n");
    repo.set_line_counts("styles.css", 300, 300);

    let report = updated(
        run(
            &StampWorkflowArgs::default(),
            dir.path(),
            &repo,
            &mut ScriptedPrompter::default(),
        )
        .unwrap(),
    );
    assert_eq!(report.magnitude.files_changed, 1);
    assert_eq!(report.new_version, "3.3.1");
}

#[test]
fn test_manual_override_is_used_verbatim() {
    let (dir, mut repo) = thousand_line_project("1.9.9");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();

    let mut prompter = ScriptedPrompter::versions(&["2.0"]);
    let report = updated(run(&StampWorkflowArgs::default(), root, &repo, &mut prompter).unwrap());

    assert_eq!(report.new_version, "2.0");
    assert_eq!(read(root, "manifest.json"), manifest("2.0"));
    assert!(read(root, "app.js").starts_with("// Version: 2.0\n"));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_malformed_override_aborts_before_any_write() {
    let (dir, mut repo) = thousand_line_project("1.9.9");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();

    let mut prompter = ScriptedPrompter::versions(&["abc"]);
    let err = run(&StampWorkflowArgs::default(), root, &repo, &mut prompter).unwrap_err();

    assert!(err.to_string().contains("invalid version format 'abc'"));
    assert_eq!(read(root, "manifest.json"), manifest("1.9.9"));
    assert!(!root.join("assets/backups").exists());
}

#[test]
fn test_malformed_set_version_aborts_before_prompting() {
    let (dir, mut repo) = thousand_line_project("1.9.9");
    repo.add_status("notes.md", FileStatus::Untracked);
    write(dir.path(), "notes.md", "# Notes\n");

    let args = StampWorkflowArgs {
        set_version: Some("abc".to_string()),
        ..StampWorkflowArgs::default()
    };
    let mut prompter = ScriptedPrompter::default();
    assert!(run(&args, dir.path(), &repo, &mut prompter).is_err());
    assert!(prompter.asked.is_empty());
    assert!(!dir.path().join(".gitignore").exists());
}

#[test]
fn test_downgrade_needs_confirmation() {
    let (dir, mut repo) = thousand_line_project("2.1.0");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();

    let args = StampWorkflowArgs {
        set_version: Some("2.0".to_string()),
        ..StampWorkflowArgs::default()
    };
    let mut prompter = ScriptedPrompter::default();
    let outcome = run(&args, root, &repo, &mut prompter).unwrap();

    assert_eq!(outcome, WorkflowOutcome::Cancelled);
    assert_eq!(prompter.asked, vec!["Downgrade anyway?"]);
    assert_eq!(read(root, "manifest.json"), manifest("2.1.0"));
}

#[test]
fn test_same_version_confirmed() {
    let (dir, mut repo) = thousand_line_project("3.3");
    repo.set_line_counts("app.js", 12, 3);

    let mut prompter = ScriptedPrompter::versions(&["3.3"]);
    prompter.confirms.push_back(true);
    let report = updated(run(&StampWorkflowArgs::default(), dir.path(), &repo, &mut prompter).unwrap());

    assert_eq!(report.new_version, "3.3");
    assert_eq!(
        report.warnings,
        vec![RunWarning::SameVersion {
            version: "3.3".to_string()
        }]
    );
}

#[test]
fn test_cancel_at_version_prompt() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);

    let mut prompter = ScriptedPrompter::versions(&["n"]);
    let outcome = run(&StampWorkflowArgs::default(), dir.path(), &repo, &mut prompter).unwrap();
    assert_eq!(outcome, WorkflowOutcome::Cancelled);
    assert_eq!(read(dir.path(), "manifest.json"), manifest("3.3.0"));
}

#[test]
fn test_dry_run_previews_without_writing() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();

    let args = StampWorkflowArgs {
        dry_run: true,
        ..StampWorkflowArgs::default()
    };
    let outcome = run(&args, root, &repo, &mut ScriptedPrompter::default()).unwrap();

    let report = match outcome {
        WorkflowOutcome::DryRun(report) => report,
        other => panic!("expected a dry run, got {:?}", other),
    };
    assert_eq!(report.new_version, "3.3.1");
    assert_eq!(report.stats.files_updated, 2);
    assert_eq!(read(root, "manifest.json"), manifest("3.3.0"));
    assert!(!root.join("assets/backups").exists());
    assert!(repo.commits().is_empty());
}

#[test]
fn test_new_files_are_staged_or_ignored() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();
    write(root, "notes.md", "# Notes\none\ntwo\nthree\n");
    write(root, "draft.md", "# Draft\n");
    write(root, "scratch.js", "let tmp;\n");
    repo.add_status("notes.md", FileStatus::Untracked);
    repo.add_status("draft.md", FileStatus::Untracked);
    repo.add_status("scratch.js", FileStatus::Untracked);

    let mut prompter = ScriptedPrompter::default();
    prompter.includes.push_back(true);
    prompter.includes.push_back(false);
    updated(run(&StampWorkflowArgs::default(), root, &repo, &mut prompter).unwrap());

    assert_eq!(prompter.asked[0], "include notes.md (3 lines)");
    assert_eq!(prompter.asked[1], "include draft.md (1 lines)");
    assert_eq!(repo.staged(), vec!["notes.md".to_string()]);
    let gitignore = read(root, ".gitignore");
    assert!(gitignore.contains("draft.md"));
    assert!(!gitignore.contains("notes.md"));
    assert!(!gitignore.contains("scratch.js"));
}

#[test]
fn test_commit_flag_commits_with_template() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);

    let args = StampWorkflowArgs {
        commit: true,
        ..StampWorkflowArgs::default()
    };
    let report = updated(run(&args, dir.path(), &repo, &mut ScriptedPrompter::default()).unwrap());

    assert_eq!(
        repo.staged(),
        vec!["*".to_string(), ":!assets/backups".to_string()]
    );
    assert_eq!(repo.commits(), vec!["chore: update version to 3.3.1".to_string()]);
    assert_eq!(report.commit.map(|id| id.len()), Some(40));
}

#[test]
fn test_unavailable_vcs_still_bumps() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_unavailable();
    let root = dir.path();

    let report = updated(
        run_stamp_workflow(
            &StampWorkflowArgs::default(),
            &Config::default(),
            root,
            now(),
            Some(&repo),
            &mut NonInteractivePrompter,
        )
        .unwrap(),
    );

    assert_eq!(report.new_version, "3.3.1");
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RunWarning::VcsUnavailable { .. })));
    assert_eq!(read(root, "manifest.json"), manifest("3.3.1"));
    assert!(report.commit.is_none());
}

#[test]
fn test_unparsable_current_version_uses_fallback() {
    let (dir, mut repo) = thousand_line_project("3.3.0");
    repo.set_line_counts("app.js", 12, 3);
    let root = dir.path();
    write(root, "manifest.json", &manifest("1.0.0-beta"));

    let report = updated(
        run(&StampWorkflowArgs::default(), root, &repo, &mut ScriptedPrompter::default()).unwrap(),
    );
    assert_eq!(report.new_version, "1.0.1");
    assert_eq!(
        report.warnings[0],
        RunWarning::UnparsableVersion {
            value: "1.0.0-beta".to_string(),
            fallback: "1.0.0".to_string(),
        }
    );
}

#[test]
fn test_without_repository_every_scanned_file_counts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", &manifest("3.3"));
    write(root, "index.html", "<!-- Version: 3.3 -->\n<p>Last Updated: May 1, 2025</p>\n");

    let report = updated(
        run_stamp_workflow::<Git2Repository, _>(
            &StampWorkflowArgs::default(),
            &Config::default(),
            root,
            now(),
            None,
            &mut NonInteractivePrompter,
        )
        .unwrap(),
    );

    assert_eq!(report.new_version, "3.3.1");
    assert_eq!(
        read(root, "index.html"),
        "<!-- Version: 3.3.1 -->\n<p>Last Updated: October 18, 2026</p>\n"
    );
}

#[test]
fn test_commit_leaves_backups_out_of_the_commit() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", &manifest("3.3.0"));
    write(root, "app.js", &"let x = 1;\n".repeat(20));

    let raw = git2::Repository::init(root).unwrap();
    {
        let mut config = raw.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    let repo = Git2Repository::from_git2(raw);
    repo.stage_all(&[]).unwrap();
    repo.commit("Initial commit").unwrap();

    write(root, "app.js", &"let y = 2;\n".repeat(20));

    let args = StampWorkflowArgs {
        commit: true,
        ..StampWorkflowArgs::default()
    };
    let report = updated(
        run_stamp_workflow(
            &args,
            &Config::default(),
            root,
            now(),
            Some(&repo),
            &mut NonInteractivePrompter,
        )
        .unwrap(),
    );
    assert!(report.commit.is_some());
    assert!(root.join("assets/backups").is_dir());

    let raw = git2::Repository::open(root).unwrap();
    let tree = raw.head().unwrap().peel_to_tree().unwrap();
    let mut committed = Vec::new();
    tree.walk(git2::TreeWalkMode::PreOrder, |parent, entry| {
        if entry.kind() == Some(git2::ObjectType::Blob) {
            committed.push(format!("{}{}", parent, entry.name().unwrap_or_default()));
        }
        git2::TreeWalkResult::Ok
    })
    .unwrap();
    committed.sort();

    assert_eq!(committed, vec!["app.js".to_string(), "manifest.json".to_string()]);
    assert!(read(root, "manifest.json").contains("\"version\": \"4.0.0\""));
}
