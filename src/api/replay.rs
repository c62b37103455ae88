//! Scripted stack API that replays a recorded transcript.
//!
//! Each method owns a queue of replies. Replies are handed out in order and the
//! last one repeats once the queue drains, so a transcript only has to spell
//! out the calls where the reply changes.
use super::{
    ChangeSet, CloudFormation, CreateChangeSetOutput, CreateStackOutput, DescribeStackEventsOutput,
    DescribeStacksOutput, StackRequest,
};
use crate::error::{ApiError, ApiResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Error reply as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
}

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply<T> {
    Ok(T),
    Error(ServiceError),
}

impl<T> Reply<T> {
    #[cfg(test)]
    pub fn error(code: &str, message: &str) -> Self {
        Self::Error(ServiceError {
            code: code.to_string(),
            message: message.to_string(),
        })
    }
}

/// Recorded replies, keyed by API method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transcript {
    #[serde(default)]
    pub create_stack: Vec<Reply<CreateStackOutput>>,
    #[serde(default)]
    pub describe_stacks: Vec<Reply<DescribeStacksOutput>>,
    #[serde(default)]
    pub describe_stack_events: Vec<Reply<DescribeStackEventsOutput>>,
    #[serde(default)]
    pub create_change_set: Vec<Reply<CreateChangeSetOutput>>,
    #[serde(default)]
    pub describe_change_set: Vec<Reply<ChangeSet>>,
    #[serde(default)]
    pub execute_change_set: Vec<Reply<()>>,
    #[serde(default)]
    pub delete_stack: Vec<Reply<()>>,
}

impl Transcript {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parse transcript {}", path.display()))
    }
}

/// A call observed by the replay client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub target: String,
}

struct Queues {
    create_stack: VecDeque<Reply<CreateStackOutput>>,
    describe_stacks: VecDeque<Reply<DescribeStacksOutput>>,
    describe_stack_events: VecDeque<Reply<DescribeStackEventsOutput>>,
    create_change_set: VecDeque<Reply<CreateChangeSetOutput>>,
    describe_change_set: VecDeque<Reply<ChangeSet>>,
    execute_change_set: VecDeque<Reply<()>>,
    delete_stack: VecDeque<Reply<()>>,
}

pub struct ReplayClient {
    queues: Mutex<Queues>,
    calls: Mutex<Vec<Call>>,
}

impl ReplayClient {
    pub fn new(transcript: Transcript) -> Self {
        let queues = Queues {
            create_stack: transcript.create_stack.into(),
            describe_stacks: transcript.describe_stacks.into(),
            describe_stack_events: transcript.describe_stack_events.into(),
            create_change_set: transcript.create_change_set.into(),
            describe_change_set: transcript.describe_change_set.into(),
            execute_change_set: transcript.execute_change_set.into(),
            delete_stack: transcript.delete_stack.into(),
        };
        Self {
            queues: Mutex::new(queues),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub fn call_count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    fn record(&self, method: &'static str, target: &str) {
        tracing::debug!(method, target, "replaying API call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                method,
                target: target.to_string(),
            });
    }

    fn reply<T: Clone>(
        &self,
        method: &'static str,
        target: &str,
        select: impl FnOnce(&mut Queues) -> &mut VecDeque<Reply<T>>,
    ) -> ApiResult<T> {
        self.record(method, target);
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = select(&mut queues);
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Error(err)) => Err(ApiError::from_service(method, &err.code, &err.message)),
            None => Err(ApiError::Transport {
                operation: method,
                code: "Unscripted".to_string(),
                message: format!("no scripted reply for {target}"),
            }),
        }
    }
}

#[async_trait]
impl CloudFormation for ReplayClient {
    async fn create_stack(&self, request: &StackRequest) -> ApiResult<CreateStackOutput> {
        self.reply("create_stack", &request.stack_name, |q| &mut q.create_stack)
    }

    async fn describe_stacks(&self, stack_name: &str) -> ApiResult<DescribeStacksOutput> {
        self.reply("describe_stacks", stack_name, |q| &mut q.describe_stacks)
    }

    async fn describe_stack_events(
        &self,
        stack_name: &str,
    ) -> ApiResult<DescribeStackEventsOutput> {
        self.reply("describe_stack_events", stack_name, |q| {
            &mut q.describe_stack_events
        })
    }

    async fn create_change_set(&self, request: &StackRequest) -> ApiResult<CreateChangeSetOutput> {
        self.reply("create_change_set", &request.stack_name, |q| {
            &mut q.create_change_set
        })
    }

    async fn describe_change_set(&self, change_set_id: &str) -> ApiResult<ChangeSet> {
        self.reply("describe_change_set", change_set_id, |q| {
            &mut q.describe_change_set
        })
    }

    async fn execute_change_set(&self, change_set_id: &str) -> ApiResult<()> {
        self.reply("execute_change_set", change_set_id, |q| {
            &mut q.execute_change_set
        })
    }

    async fn delete_stack(&self, stack_name: &str) -> ApiResult<()> {
        self.reply("delete_stack", stack_name, |q| &mut q.delete_stack)
    }
}
