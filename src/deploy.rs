//! Deploy: create the stack if it is missing, otherwise update it through a
//! reviewed change set.
//!
//! Operations run one after another through a single presenter, so the
//! resource display and the final banner cover the whole chain.
use crate::api::{ChangeSet, Stack, StackReference, StackRequest};
use crate::blocking;
use crate::engine::StackEngine;
use crate::event::{Abort, EngineEvent, StackNotice};
use crate::presenter::{forward, Outcome, Presenter};
use crate::status::StateCategory;
use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::sync::OnceLock;
use tracing::info;

/// Stack status that only allows replacing the stack.
const ROLLBACK_COMPLETE: &str = "ROLLBACK_COMPLETE";

pub const NO_CHANGES: &str = "No changes to deploy";
pub const USER_ABORT: &str = "User abort!";

/// Decides whether a reviewed change may go ahead.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Approves everything (`--yes`).
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        info!(prompt, "auto-approved");
        Ok(true)
    }
}

/// Asks on the terminal. Anything but `y`/`yes` declines, including EOF.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt} [y/N] ")?;
        stdout.flush()?;
        let mut answer = String::new();
        // Runs on a runtime worker; hand the thread over while stdin blocks.
        tokio::task::block_in_place(|| io::stdin().lock().read_line(&mut answer))
            .context("read confirmation")?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

fn no_changes() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)didn't contain changes|no updates are to be performed")
            .expect("regex for empty change sets")
    })
}

/// Run the deploy chain for `request` and report how it ended.
pub async fn deploy(
    engine: &StackEngine,
    request: StackRequest,
    confirm: &mut dyn Confirm,
    presenter: &mut dyn Presenter,
) -> Result<Outcome> {
    let reference = StackReference::from(request.stack_name.as_str());
    let found = blocking::first(engine.find_stack(&reference), engine.config().lookup_timeout)
        .await
        .with_context(|| format!("look up stack {}", reference.as_str()))?;

    match found {
        None => {
            info!(stack = reference.as_str(), "stack not found, creating");
            let last = forward(presenter, engine.create_stack(request)).await?;
            Ok(Outcome::Settled(last))
        }
        Some(stack) if stack.stack_status == ROLLBACK_COMPLETE => {
            recreate(engine, stack, request, confirm, presenter).await
        }
        Some(stack) => update(engine, stack, request, confirm, presenter).await,
    }
}

async fn recreate(
    engine: &StackEngine,
    stack: Stack,
    request: StackRequest,
    confirm: &mut dyn Confirm,
    presenter: &mut dyn Presenter,
) -> Result<Outcome> {
    let prompt = format!("Delete and re-create {}?", stack.stack_name);
    let reference = StackReference::from(stack.stack_name.as_str());
    presenter.on_event(&EngineEvent::StackNotice(StackNotice::Recreate(stack)))?;
    if !confirm.confirm(&prompt)? {
        return abort(presenter, USER_ABORT);
    }
    let deleted = forward(presenter, engine.delete_stack(&reference)).await?;
    if deleted == Some(StateCategory::Failure) {
        info!(stack = reference.as_str(), "delete failed, not re-creating");
        return Ok(Outcome::Settled(deleted));
    }
    let last = forward(presenter, engine.create_stack(request)).await?;
    Ok(Outcome::Settled(last))
}

async fn update(
    engine: &StackEngine,
    stack: Stack,
    request: StackRequest,
    confirm: &mut dyn Confirm,
    presenter: &mut dyn Presenter,
) -> Result<Outcome> {
    info!(stack = %stack.stack_name, status = %stack.stack_status, "stack exists, updating");
    let change_set = prepare(engine, request, presenter).await?;
    if change_set.is_failed() {
        let reason = change_set.status_reason.unwrap_or_default();
        if no_changes().is_match(&reason) {
            return abort(presenter, NO_CHANGES);
        }
        return abort(presenter, &reason);
    }
    if !confirm.confirm(&format!("Update {}?", change_set.stack_name))? {
        return abort(presenter, USER_ABORT);
    }
    let events = engine.update_stack(&change_set.stack_id, &change_set.change_set_id);
    let last = forward(presenter, events).await?;
    Ok(Outcome::Settled(last))
}

/// Present the change-set stream and return the change set it settled on.
async fn prepare(
    engine: &StackEngine,
    request: StackRequest,
    presenter: &mut dyn Presenter,
) -> Result<ChangeSet> {
    let mut events = engine.prepare_update(request);
    let mut settled = None;
    while let Some(item) = events.next().await {
        let event = item?;
        presenter.on_event(&event)?;
        if let EngineEvent::ChangeSetReady(change_set) = event {
            settled = Some(change_set);
        }
    }
    settled.ok_or_else(|| anyhow!("change set stream ended without a change set"))
}

fn abort(presenter: &mut dyn Presenter, message: &str) -> Result<Outcome> {
    presenter.on_event(&EngineEvent::Abort(Abort::new(message)))?;
    Ok(Outcome::Aborted)
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
