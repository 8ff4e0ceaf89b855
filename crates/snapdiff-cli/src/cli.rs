use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "snapdiff",
    about = "snapdiff: compare file-tree snapshots line by line",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with diff defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Commit two files in a scratch directory, edit the tree, and diff it
    Demo(DemoArgs),
    /// Compare two directories
    Dirs(DirsArgs),
}

#[derive(Args, Debug, Default)]
pub struct DiffFlags {
    /// Lines of context around each change
    #[arg(short = 'U', long = "context")]
    pub context: Option<usize>,
    /// Line-diff content even if it contains NUL bytes
    #[arg(long)]
    pub no_binary_detect: bool,
    /// Only report paths under this prefix (repeatable)
    #[arg(long = "path")]
    pub paths: Vec<String>,
    /// Print a per-path summary instead of hunks
    #[arg(long)]
    pub stat: bool,
    /// Diff content on this many worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Leave the scratch directory on disk
    #[arg(long)]
    pub keep: bool,
    #[command(flatten)]
    pub diff: DiffFlags,
}

#[derive(Args)]
pub struct DirsArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[command(flatten)]
    pub diff: DiffFlags,
}
