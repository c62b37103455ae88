//! Stream subscribers that turn engine events into terminal output.
//!
//! A chain of operations (lookup, then create or update) is presented by one
//! presenter: [`forward`] feeds each operation's stream in turn and [`finish`]
//! closes the chain with either the completion banner or the error banner.
use crate::engine::EventStream;
use crate::event::EngineEvent;
use crate::render::Renderer;
use crate::resources::ResourceStateAggregator;
use crate::status::StateCategory;
use anyhow::Result;
use futures::StreamExt;
use std::io::Write;

pub trait Presenter {
    fn on_event(&mut self, event: &EngineEvent) -> Result<()>;

    /// Error banner with the full cause chain. Written to stderr so it
    /// survives a redirected progress display.
    fn on_error(&mut self, err: &anyhow::Error) {
        eprintln!("Error:\n{err:?}");
    }

    fn on_complete(&mut self) -> Result<()>;
}

/// How a presented chain of operations ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to completion; carries the last stack-level category seen.
    Settled(Option<StateCategory>),
    /// Stopped on request before mutating anything further.
    Aborted,
    /// Ended by an API error or a presentation failure.
    Errored,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        !matches!(
            self,
            Self::Errored | Self::Settled(Some(StateCategory::Failure))
        )
    }
}

/// Feed one operation's events to `presenter`.
///
/// Returns the category of the last stack-level event. A stream error or a
/// presentation failure ends the operation with `Err`.
pub async fn forward(
    presenter: &mut dyn Presenter,
    mut events: EventStream,
) -> Result<Option<StateCategory>> {
    let mut last = None;
    while let Some(item) = events.next().await {
        let event = item?;
        if let EngineEvent::Resource(classified) = &event {
            if classified.event.is_stack_level() {
                last = Some(classified.category);
            }
        }
        presenter.on_event(&event)?;
    }
    Ok(last)
}

/// Close a presented chain with its banner.
pub fn finish(presenter: &mut dyn Presenter, result: Result<Outcome>) -> Outcome {
    let result = result.and_then(|outcome| presenter.on_complete().map(|()| outcome));
    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            presenter.on_error(&err);
            Outcome::Errored
        }
    }
}

/// Prints the debug form of every event.
pub struct RawPresenter<W: Write> {
    out: W,
}

impl<W: Write> RawPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for RawPresenter<W> {
    fn on_event(&mut self, event: &EngineEvent) -> Result<()> {
        writeln!(self.out, "{event:?}")?;
        Ok(())
    }

    fn on_complete(&mut self) -> Result<()> {
        writeln!(self.out, "Done.")?;
        Ok(())
    }
}

/// Keeps the resource index and drives a [`Renderer`] from it.
pub struct RendererPresenter<R: Renderer> {
    resources: ResourceStateAggregator,
    renderer: R,
}

impl<R: Renderer> RendererPresenter<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            resources: ResourceStateAggregator::new(),
            renderer,
        }
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: Renderer> Presenter for RendererPresenter<R> {
    fn on_event(&mut self, event: &EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Resource(classified) => {
                let resource = self.resources.record(classified);
                self.renderer.event(classified, resource)?;
                self.renderer.clear()?;
                for resource in self.resources.resources() {
                    self.renderer.resource(resource)?;
                }
                Ok(())
            }
            EngineEvent::ChangeSetReady(change_set) => self.renderer.change_set(change_set),
            EngineEvent::StackNotice(notice) => self.renderer.stack_notice(notice),
            EngineEvent::Abort(abort) => self.renderer.abort(abort),
        }
    }

    fn on_complete(&mut self) -> Result<()> {
        self.renderer.done()
    }
}
