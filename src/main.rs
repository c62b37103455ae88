use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod api;
mod blocking;
mod cli;
mod config;
mod cursor;
mod deploy;
mod engine;
mod error;
mod event;
mod presenter;
mod render;
mod resources;
mod snapshot;
mod status;
mod workflow;

use cli::{Command, RootArgs};
use config::EngineConfig;

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let config =
        EngineConfig::from_env()?.with_overrides(args.poll_pause_ms, args.lookup_timeout_ms);
    tracing::debug!(?config, "engine configured");

    match args.command {
        Command::Deploy(args) => workflow::run_deploy(config, args),
        Command::Delete(args) => workflow::run_delete(config, args),
        Command::Dump(args) => workflow::run_dump(config, args),
    }
}

/// Diagnostics go to stderr; stdout carries the progress display.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,stackwatch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
