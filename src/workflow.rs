//! Command runners: load inputs, wire the engine to a presenter, and map the
//! result to an exit status.
use crate::api::replay::{ReplayClient, Transcript};
use crate::api::{StackReference, StackRequest};
use crate::cli::{DeleteArgs, DeployArgs, DumpArgs, TargetArgs};
use crate::config::EngineConfig;
use crate::deploy::{deploy, AutoApprove, Confirm, StdinConfirm};
use crate::engine::StackEngine;
use crate::presenter::{finish, forward, Outcome, Presenter, RawPresenter, RendererPresenter};
use crate::render::ProgressRenderer;
use crate::snapshot::StackSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

pub fn run_deploy(config: EngineConfig, args: DeployArgs) -> Result<ExitCode> {
    let mut request = StackRequest {
        stack_name: args.target.stack.clone(),
        template_url: args.template_url.clone(),
        ..StackRequest::default()
    };
    if let Some(path) = &args.snapshot {
        StackSnapshot::load(path)?.apply_to(&mut request);
    }
    let engine = engine(config, &args.target)?;
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(StdinConfirm)
    };
    let mut presenter = presenter(args.raw);
    let runtime = runtime()?;
    let result = runtime.block_on(deploy(
        &engine,
        request,
        confirm.as_mut(),
        presenter.as_mut(),
    ));
    Ok(exit_code(finish(presenter.as_mut(), result)))
}

pub fn run_delete(config: EngineConfig, args: DeleteArgs) -> Result<ExitCode> {
    let engine = engine(config, &args.target)?;
    let reference = StackReference::from(args.target.stack.as_str());
    let mut presenter = presenter(args.raw);
    let runtime = runtime()?;
    let result = runtime.block_on(async {
        let last = forward(presenter.as_mut(), engine.delete_stack(&reference)).await?;
        Ok::<_, anyhow::Error>(Outcome::Settled(last))
    });
    Ok(exit_code(finish(presenter.as_mut(), result)))
}

pub fn run_dump(config: EngineConfig, args: DumpArgs) -> Result<ExitCode> {
    let engine = engine(config, &args.target)?;
    let reference = StackReference::from(args.target.stack.as_str());
    let Some(stack) = engine.find_stack_blocking(&reference)? else {
        eprintln!("No such stack {}", reference.as_str());
        return Ok(ExitCode::FAILURE);
    };
    let yaml = StackSnapshot::from_stack(&stack).to_yaml()?;
    match &args.out {
        Some(path) => {
            fs::write(path, yaml).with_context(|| format!("write {}", path.display()))?;
        }
        None => print!("{yaml}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn engine(config: EngineConfig, target: &TargetArgs) -> Result<StackEngine> {
    let transcript = Transcript::load(&target.transcript)?;
    let client = Arc::new(ReplayClient::new(transcript));
    Ok(StackEngine::new(client, config))
}

fn presenter(raw: bool) -> Box<dyn Presenter> {
    if raw {
        Box::new(RawPresenter::new(io::stdout()))
    } else {
        Box::new(RendererPresenter::new(ProgressRenderer::new(io::stdout())))
    }
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("start async runtime")
}

fn exit_code(outcome: Outcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
