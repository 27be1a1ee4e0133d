//! rnup - React Native upgrade assistant CLI
//!
//! Reconciles a project's package.json against the upstream release diff
//! between two React Native versions and applies the approved edits.

use clap::Parser;
use rnup::cli::{ApplyArgs, CliArgs, Command, InfoArgs, TargetArgs};
use rnup::config::Settings;
use rnup::debounce::Debouncer;
use rnup::error::{AppError, RegistryError, ValidationError};
use rnup::output::{create_formatter, OutputConfig, OutputFormatter};
use rnup::reconcile::Selection;
use rnup::registry::{DirectoryClient, FileDiffSource, HttpClient};
use rnup::state::UpgradeState;
use rnup::watch::ManifestWatcher;
use rnup::workflow::UpgradeWorkflow;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    rnup::logging::init(args.verbose, args.quiet);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let project_dir = args.command.path().to_path_buf();
    let settings = Settings::load(&project_dir, args.config.as_deref())?;

    if args.verbose {
        eprintln!("rnup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Project: {}", project_dir.display());
        if !args.command.is_read_only() {
            eprintln!("Mode: write");
        }
    }

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let show_progress = !args.quiet && !args.json;

    match &args.command {
        Command::Check(check) => {
            let workflow = build_workflow(settings, &check.target, false, show_progress)?;
            check_once(&workflow, &project_dir, &check.target, formatter.as_ref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Apply(apply) => {
            let workflow = build_workflow(settings, &apply.target, apply.dry_run, show_progress)?;
            run_apply(&workflow, &project_dir, apply, formatter.as_ref()).await
        }
        Command::Info(info) => {
            let workflow = UpgradeWorkflow::new(settings, true)?.with_progress(show_progress);
            run_info(&workflow, &project_dir, info, formatter.as_ref()).await
        }
        Command::Watch(watch) => {
            let workflow = build_workflow(settings, &watch.target, false, show_progress)?;
            run_watch(&workflow, &project_dir, &watch.target, formatter.as_ref()).await
        }
        Command::Reset(_) => {
            UpgradeState::clear(&project_dir)?;
            if !args.quiet && !args.json {
                println!("Upgrade state cleared");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Build the workflow, reading the diff from a local file when one is given
fn build_workflow(
    settings: Settings,
    target: &TargetArgs,
    dry_run: bool,
    show_progress: bool,
) -> Result<UpgradeWorkflow, AppError> {
    let workflow = match &target.diff_file {
        Some(diff_file) => {
            let client = HttpClient::with_timeout(settings.timeout()).map_err(|e| {
                RegistryError::network_error("HTTP client", e.to_string())
            })?;
            let info_source = DirectoryClient::with_url(client, &settings.metadata_url);
            UpgradeWorkflow::with_sources(
                settings,
                Box::new(FileDiffSource::new(diff_file)),
                Box::new(info_source),
                dry_run,
            )
        }
        None => UpgradeWorkflow::new(settings, dry_run)?,
    };
    Ok(workflow.with_progress(show_progress))
}

/// Target release: `--to`, or the upgrade in progress
fn resolve_target(to: Option<&str>, state: &UpgradeState) -> Result<String, ValidationError> {
    to.or(state.active_target())
        .map(str::to_string)
        .ok_or(ValidationError::MissingTarget)
}

/// Save the state if the run changed it
fn persist_state(
    project_dir: &Path,
    before: &UpgradeState,
    after: &UpgradeState,
) -> Result<(), AppError> {
    if before != after {
        after.save(project_dir)?;
    }
    Ok(())
}

/// Analyze once and print the requirements
async fn check_once(
    workflow: &UpgradeWorkflow,
    project_dir: &Path,
    target_args: &TargetArgs,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<()> {
    let mut state = UpgradeState::load(project_dir)?;
    let before = state.clone();
    let target = resolve_target(target_args.to.as_deref(), &state)?;

    let result = workflow
        .analyze(project_dir, &target, target_args.from.as_deref(), &mut state)
        .await;
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            persist_state(project_dir, &before, &state)?;
            return Err(e.into());
        }
    };

    if target_args.to.is_some() {
        state.enable(&analysis.pair.to, &analysis.current_version);
    }
    persist_state(project_dir, &before, &state)?;

    let results = Selection::new()
        .with_include_dev(target_args.dev)
        .filter(&analysis.results);
    let mut stdout = io::stdout().lock();
    formatter.format_check(&analysis, &results, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

async fn run_apply(
    workflow: &UpgradeWorkflow,
    project_dir: &Path,
    args: &ApplyArgs,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    let mut state = UpgradeState::load(project_dir)?;
    let before = state.clone();
    let target = resolve_target(args.target.to.as_deref(), &state)?;
    let selection = Selection::new()
        .with_include_dev(args.target.dev)
        .with_only(args.only.clone())
        .with_exclude(args.exclude.clone());

    let result = workflow
        .apply(
            project_dir,
            &target,
            args.target.from.as_deref(),
            &selection,
            &mut state,
        )
        .await;
    let run = match result {
        Ok(run) => run,
        Err(e) => {
            persist_state(project_dir, &before, &state)?;
            return Err(e.into());
        }
    };

    if args.target.to.is_some() && !args.dry_run {
        state.enable(&run.analysis.pair.to, &run.analysis.current_version);
    }
    if !args.dry_run {
        persist_state(project_dir, &before, &state)?;
    }

    let mut stdout = io::stdout().lock();
    formatter.format_apply(&run, &mut stdout)?;
    stdout.flush()?;

    if run.selected.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else if run.report.nothing_applied() {
        Ok(ExitCode::FAILURE)
    } else if run.report.is_partial() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_info(
    workflow: &UpgradeWorkflow,
    project_dir: &Path,
    args: &InfoArgs,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    if args.refresh {
        workflow.refresh_metadata(project_dir)?;
    }
    let run = workflow.info(project_dir, args.dev).await?;

    let mut stdout = io::stdout().lock();
    formatter.format_info(&run, &mut stdout)?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

async fn run_watch(
    workflow: &UpgradeWorkflow,
    project_dir: &Path,
    target: &TargetArgs,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    let manifest_path = workflow.manifest_path(project_dir);
    let (_watcher, mut rx) = ManifestWatcher::start(&manifest_path)?;
    let debouncer = Debouncer::new(workflow.settings().debounce());
    eprintln!("Watching {} (Ctrl-C to stop)", manifest_path.display());

    if let Err(e) = check_once(workflow, project_dir, target, formatter).await {
        eprintln!("Error: {}", e);
    }

    loop {
        tokio::select! {
            burst = debouncer.next_burst(&mut rx) => {
                let Some(events) = burst else { break };
                debug!(events, "manifest changed");
                if let Err(e) = check_once(workflow, project_dir, target, formatter).await {
                    eprintln!("Error: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(ExitCode::SUCCESS)
}
