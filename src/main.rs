use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use version_stamper::cli::{run_stamp_workflow, StampWorkflowArgs, WorkflowOutcome};
use version_stamper::config;
use version_stamper::git::{Git2Repository, Repository};
use version_stamper::ui::{self, NonInteractivePrompter, TerminalPrompter};
use version_stamper::warning::RunWarning;

#[derive(clap::Parser)]
#[command(
    name = "version-stamper",
    about = "Bump and stamp the project version when the code really changed"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Project directory (defaults to the current directory)")]
    dir: Option<PathBuf>,

    #[arg(short, long, help = "Update the version even without code changes")]
    force: bool,

    #[arg(short, long, help = "Answer every prompt with its default")]
    yes: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, value_name = "X.Y[.Z]", help = "Use this version instead of the proposed one")]
    set_version: Option<String>,

    #[arg(long, help = "Commit the update without asking")]
    commit: bool,

    #[arg(long, help = "Show diagnostic output")]
    verbose: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();

    if args.version {
        println!("version-stamper {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    let repo = match Git2Repository::open(&dir) {
        Ok(repo) => Some(repo),
        Err(e) => {
            ui::display_warning(&RunWarning::VcsUnavailable {
                operation: "opening the repository".to_string(),
                reason: e.to_string(),
            });
            None
        }
    };
    let root = repo
        .as_ref()
        .and_then(|repo| repo.workdir().map(|path| path.to_path_buf()))
        .unwrap_or(dir);

    let config = config::load_config(args.config.as_deref(), &root)
        .context("error loading config")?;

    let workflow_args = StampWorkflowArgs {
        force: args.force,
        dry_run: args.dry_run,
        set_version: args.set_version,
        commit: args.commit,
    };

    let now = Local::now();
    let outcome = if args.yes {
        run_stamp_workflow(
            &workflow_args,
            &config,
            &root,
            now,
            repo.as_ref(),
            &mut NonInteractivePrompter,
        )?
    } else {
        run_stamp_workflow(
            &workflow_args,
            &config,
            &root,
            now,
            repo.as_ref(),
            &mut TerminalPrompter,
        )?
    };

    match outcome {
        WorkflowOutcome::NoChanges => {
            println!("No version update needed.");
        }
        WorkflowOutcome::Cancelled => {
            println!("Operation cancelled by user.");
        }
        WorkflowOutcome::DryRun(report) => {
            ui::display_status(&format!(
                "Dry run: {} -> {} ({} file(s) would change)",
                report.old_version, report.new_version, report.stats.files_updated
            ));
        }
        WorkflowOutcome::Updated(report) => {
            println!(
                "\n{} Version {} stamped into {} file(s)\n",
                console::style("✓").green(),
                report.new_version,
                report.stats.files_updated
            );
        }
    }

    Ok(())
}
