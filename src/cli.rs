//! CLI argument parsing module for rnup

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Validate a release version given on the command line
fn parse_version(s: &str) -> Result<String, String> {
    crate::version::parse_release(s)
        .map(|v| v.to_string())
        .map_err(|e| e.to_string())
}

/// React Native upgrade assistant
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rnup",
    version,
    about = "Reconcile package.json against upstream React Native release diffs"
)]
pub struct CliArgs {
    /// Settings file (default: rnup.toml in the project directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the changes package.json needs for a target release
    Check(CheckArgs),
    /// Apply the changes package.json needs for a target release
    Apply(ApplyArgs),
    /// Show compatibility information for declared dependencies
    Info(InfoArgs),
    /// Re-run check whenever package.json changes
    Watch(WatchArgs),
    /// Forget the upgrade in progress
    Reset(ResetArgs),
}

/// Options shared by commands that reconcile against a target release
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Release to upgrade to (default: the upgrade in progress)
    #[arg(long, value_parser = parse_version)]
    pub to: Option<String>,

    /// Release to upgrade from (default: the declared react-native version)
    #[arg(long, value_parser = parse_version)]
    pub from: Option<String>,

    /// Read the upgrade diff from a local file instead of fetching it
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Include devDependencies
    #[arg(long)]
    pub dev: bool,
}

/// `check` options
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// `apply` options
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Apply only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    /// Leave specific packages alone (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Dry run mode - show what would be applied without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// `info` options
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include devDependencies
    #[arg(long)]
    pub dev: bool,

    /// Drop cached diffs and metadata before querying
    #[arg(long)]
    pub refresh: bool,
}

/// `watch` options
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// `reset` options
#[derive(Args, Debug, Clone)]
pub struct ResetArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl Command {
    /// Project directory the command operates on
    pub fn path(&self) -> &Path {
        match self {
            Command::Check(args) => &args.target.path,
            Command::Apply(args) => &args.target.path,
            Command::Info(args) => &args.path,
            Command::Watch(args) => &args.target.path,
            Command::Reset(args) => &args.path,
        }
    }

    /// Returns true if the command never writes the manifest
    pub fn is_read_only(&self) -> bool {
        match self {
            Command::Apply(args) => args.dry_run,
            _ => true,
        }
    }
}
