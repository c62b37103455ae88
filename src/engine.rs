//! Stack operation engine.
//!
//! Turns the request/response stack API into live event streams. Every
//! mutating operation issues its API call, then polls the stack's event
//! history until a terminal status shows up on the stack itself:
//!
//! ```text
//! Pending -> Polling -> { Succeeded | Failed | Deleted }
//! ```
//!
//! Each operation runs as one spawned task that owns its watermark. The task
//! feeds a bounded channel and stops as soon as the receiving stream is
//! dropped, including while it sleeps between polls. A rollback or failed
//! stack is a normal completion whose last item is the failure-classified
//! stack event; only API errors end a stream with `Err`.
//!
//! Mutating operations spawn their task immediately and must be started from
//! within a Tokio runtime.
use crate::api::{CloudFormation, Stack, StackReference, StackRequest};
use crate::blocking;
use crate::config::EngineConfig;
use crate::cursor::PollCursor;
use crate::error::EngineError;
use crate::event::{ClassifiedEvent, EngineEvent};
use crate::status::StateCategory;
use chrono::{DateTime, Utc};
use futures::{future, stream, Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// Stream of results produced by one operation.
pub type OpStream<T> = Pin<Box<dyn Stream<Item = Result<T, EngineError>> + Send>>;

/// Stream of a mutating operation's progress.
pub type EventStream = OpStream<EngineEvent>;

/// Source of "now", used to ignore history older than the operation.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Maximum number of events buffered ahead of a slow subscriber.
const EVENT_BUFFER_SIZE: usize = 64;

/// Lifecycle of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationState {
    Pending,
    Polling,
    Succeeded,
    Failed,
    Deleted,
}

impl OperationState {
    fn terminal(category: StateCategory) -> Option<Self> {
        match category {
            StateCategory::InProgress => None,
            StateCategory::Success => Some(Self::Succeeded),
            StateCategory::Failure => Some(Self::Failed),
            StateCategory::Deleted => Some(Self::Deleted),
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Entry point for stack operations against one API client.
#[derive(Clone)]
pub struct StackEngine {
    client: Arc<dyn CloudFormation>,
    config: EngineConfig,
    clock: Clock,
}

impl StackEngine {
    pub fn new(client: Arc<dyn CloudFormation>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock that seeds each operation's watermark.
    #[cfg(test)]
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Look up a stack. Emits the stack record, or completes empty when the
    /// reply lists none. Absence reported as an API error stays an error
    /// here; [`blocking::first`] turns it into an empty result.
    ///
    /// The lookup is lazy: nothing is sent until the stream is polled.
    pub fn find_stack(&self, reference: &StackReference) -> OpStream<Stack> {
        let client = Arc::clone(&self.client);
        let name = reference.as_str().to_string();
        let lookup = async move {
            let reply = client.describe_stacks(&name).await?;
            Ok::<_, EngineError>(reply.stacks.into_iter().next())
        };
        Box::pin(stream::once(lookup).filter_map(|found| future::ready(found.transpose())))
    }

    /// Synchronous lookup for callers outside any async runtime.
    pub fn find_stack_blocking(
        &self,
        reference: &StackReference,
    ) -> Result<Option<Stack>, EngineError> {
        blocking::block_on_first(self.find_stack(reference), self.config.lookup_timeout)
    }

    /// Create a stack and stream its events until the stack settles.
    pub fn create_stack(&self, request: StackRequest) -> EventStream {
        let since = (self.clock)();
        self.spawn("create", move |op| async move {
            let created = op.client.create_stack(&request).await?;
            info!(stack_id = %created.stack_id, "stack creation started");
            op.poll_events(&created.stack_id, since, false).await
        })
    }

    /// Create a change set and wait until the service has computed it.
    ///
    /// Emits exactly one [`EngineEvent::ChangeSetReady`], whether the change
    /// set is ready or failed. Never polls resource events.
    pub fn prepare_update(&self, request: StackRequest) -> EventStream {
        self.spawn("prepare_update", move |op| async move {
            let created = op.client.create_change_set(&request).await?;
            info!(
                change_set_id = %created.id,
                stack_id = %created.stack_id,
                "change set requested"
            );
            loop {
                let change_set = op.client.describe_change_set(&created.id).await?;
                if !change_set.is_pending() {
                    let state = if change_set.is_failed() {
                        OperationState::Failed
                    } else {
                        OperationState::Succeeded
                    };
                    debug!(status = %change_set.status, "change set settled");
                    if !op.emit(EngineEvent::ChangeSetReady(change_set)).await {
                        return Ok(None);
                    }
                    return Ok(Some(state));
                }
                if !op.pause().await {
                    return Ok(None);
                }
            }
        })
    }

    /// Execute a prepared change set and stream the stack's events.
    pub fn update_stack(&self, stack_id: &str, change_set_id: &str) -> EventStream {
        let since = (self.clock)();
        let stack_id = stack_id.to_string();
        let change_set_id = change_set_id.to_string();
        self.spawn("update", move |op| async move {
            op.client.execute_change_set(&change_set_id).await?;
            info!(%stack_id, %change_set_id, "change set execution started");
            op.poll_events(&stack_id, since, false).await
        })
    }

    /// Delete a stack and stream its events until it is gone.
    ///
    /// Event history vanishes with the stack, so existence is polled
    /// alongside the events and absence ends the operation.
    pub fn delete_stack(&self, reference: &StackReference) -> EventStream {
        let since = (self.clock)();
        let name = reference.as_str().to_string();
        self.spawn("delete", move |op| async move {
            op.client.delete_stack(&name).await?;
            info!(stack = %name, "stack deletion started");
            op.poll_events(&name, since, true).await
        })
    }

    fn spawn<F, Fut>(&self, operation: &'static str, run: F) -> EventStream
    where
        F: FnOnce(Operation) -> Fut,
        Fut: Future<Output = Result<Option<OperationState>, EngineError>>
            + Send
            + 'static,
    {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let op = Operation {
            client: Arc::clone(&self.client),
            pause: self.config.poll_pause,
            tx: tx.clone(),
        };
        debug!(operation, state = %OperationState::Pending, "operation issued");
        let task = run(op);
        tokio::spawn(async move {
            match task.await {
                Ok(Some(state)) => info!(operation, %state, "operation finished"),
                Ok(None) => debug!(operation, "subscriber gone, polling stopped"),
                Err(err) => {
                    info!(operation, %err, "operation aborted by API error");
                    let _ = tx.send(Err(err)).await;
                }
            }
        });
        Box::pin(ReceiverStream::new(rx))
    }
}

/// Per-operation handle owned by the polling task.
struct Operation {
    client: Arc<dyn CloudFormation>,
    pause: Duration,
    tx: mpsc::Sender<Result<EngineEvent, EngineError>>,
}

impl Operation {
    /// Forward one item; `false` once the subscriber is gone.
    async fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(Ok(event)).await.is_ok()
    }

    /// Sleep between polls; `false` if the subscriber left meanwhile.
    async fn pause(&self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.pause) => true,
            _ = self.tx.closed() => false,
        }
    }

    /// Poll `target`'s events until the stack reaches a terminal status.
    ///
    /// Returns `None` when the subscriber left first.
    async fn poll_events(
        &self,
        target: &str,
        since: DateTime<Utc>,
        watch_existence: bool,
    ) -> Result<Option<OperationState>, EngineError> {
        let mut cursor = PollCursor::since(since);
        debug!(stack = target, state = %OperationState::Polling, "polling stack events");
        loop {
            if self.tx.is_closed() {
                return Ok(None);
            }

            let batch = match self.client.describe_stack_events(target).await {
                Ok(reply) => reply.stack_events,
                Err(err) if watch_existence && err.is_not_found() => Vec::new(),
                Err(err) => return Err(err.into()),
            };
            let gone = watch_existence && self.stack_gone(target).await?;

            let fresh = cursor.advance(batch);
            debug!(
                stack = target,
                fresh = fresh.len(),
                gone,
                watermark = ?cursor.watermark(),
                "polled"
            );
            let mut outcome = None;
            for event in fresh {
                let classified = ClassifiedEvent::new(event);
                if classified.event.is_stack_level() {
                    outcome = OperationState::terminal(classified.category);
                }
                if !self.emit(EngineEvent::Resource(classified)).await {
                    return Ok(None);
                }
                if outcome.is_some() {
                    break;
                }
            }
            if gone {
                outcome = Some(OperationState::Deleted);
            }
            if outcome.is_some() {
                return Ok(outcome);
            }

            if !self.pause().await {
                return Ok(None);
            }
        }
    }

    async fn stack_gone(&self, target: &str) -> Result<bool, EngineError> {
        match self.client.describe_stacks(target).await {
            Ok(reply) => Ok(match reply.stacks.first() {
                Some(stack) => stack.stack_status == "DELETE_COMPLETE",
                None => true,
            }),
            Err(err) if err.is_not_found() => Ok(true),
            Err(err) => Err(err.into()),
        }
    }
}
