//! CLI argument parsing.
//!
//! The CLI is thin: it names inputs and leaves every decision to the
//! command runners.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "stackwatch",
    version,
    about = "Live progress for stack deploys and deletes",
    after_help = "Examples:\n  stackwatch deploy --stack web --transcript web.json --snapshot web.yml\n  stackwatch delete --stack web --transcript web.json\n  stackwatch dump --stack web --transcript web.json --out web.yml",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log engine activity to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Pause between polls, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub poll_pause_ms: Option<u64>,

    /// Upper bound for single-shot lookups, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub lookup_timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Deploy(DeployArgs),
    Delete(DeleteArgs),
    Dump(DumpArgs),
}

/// Stack API source shared by every command.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Stack name
    #[arg(long, value_name = "NAME")]
    pub stack: String,

    /// Recorded API replies to replay
    #[arg(long, value_name = "FILE")]
    pub transcript: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Create or update a stack and follow its progress")]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Template location passed to the stack API
    #[arg(long, value_name = "URL")]
    pub template_url: Option<String>,

    /// Snapshot providing parameters and tags
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Approve change sets and re-creation without asking
    #[arg(long)]
    pub yes: bool,

    /// Print raw events instead of the progress display
    #[arg(long)]
    pub raw: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Delete a stack and follow its progress")]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print raw events instead of the progress display
    #[arg(long)]
    pub raw: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Write a stack's parameters and tags as a snapshot")]
pub struct DumpArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the snapshot here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}
