//! Stack API data model and the capability trait the engine polls through.
//!
//! The wire shapes mirror the service's describe/create replies closely; the
//! engine only relies on the fields declared here.
use crate::error::ApiResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod replay;

/// Name or id identifying a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackReference(pub String);

impl StackReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StackReference {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub parameter_key: String,
    pub parameter_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Stack record as returned by `describe_stacks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub stack_id: String,
    pub stack_name: String,
    pub stack_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeStacksOutput {
    #[serde(default)]
    pub stacks: Vec<Stack>,
}

/// One entry of a stack's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    pub event_id: String,
    pub stack_id: String,
    #[serde(default)]
    pub stack_name: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: String,
    pub resource_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_status_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StackEvent {
    /// Events about the stack itself rather than one of its resources.
    pub fn is_stack_level(&self) -> bool {
        self.logical_resource_id == self.stack_id
            || (!self.stack_name.is_empty() && self.logical_resource_id == self.stack_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeStackEventsOutput {
    #[serde(default)]
    pub stack_events: Vec<StackEvent>,
}

/// Inputs for `create_stack` and `create_change_set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRequest {
    pub stack_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStackOutput {
    pub stack_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChangeSetOutput {
    pub id: String,
    pub stack_id: String,
}

/// Planned change to one resource in a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub logical_resource_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub action: String,
    /// `True`, `False`, `Conditional`, or absent for non-modify actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Reply of `describe_change_set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub change_set_id: String,
    pub stack_id: String,
    pub stack_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub changes: Vec<ResourceChange>,
}

impl ChangeSet {
    /// Still being computed by the service.
    pub fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "CREATE_PENDING" | "CREATE_IN_PROGRESS")
    }

    pub fn is_failed(&self) -> bool {
        self.status == "FAILED"
    }
}

/// The narrow slice of the stack API the engine consumes.
///
/// Implementations own transport, credentials, and pagination; every method
/// returns the complete reply for one call.
#[async_trait]
pub trait CloudFormation: Send + Sync {
    async fn create_stack(&self, request: &StackRequest) -> ApiResult<CreateStackOutput>;

    async fn describe_stacks(&self, stack_name: &str) -> ApiResult<DescribeStacksOutput>;

    async fn describe_stack_events(&self, stack_name: &str)
        -> ApiResult<DescribeStackEventsOutput>;

    async fn create_change_set(&self, request: &StackRequest) -> ApiResult<CreateChangeSetOutput>;

    async fn describe_change_set(&self, change_set_id: &str) -> ApiResult<ChangeSet>;

    async fn execute_change_set(&self, change_set_id: &str) -> ApiResult<()>;

    async fn delete_stack(&self, stack_name: &str) -> ApiResult<()>;
}
