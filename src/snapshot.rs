//! Persisted stack snapshot: a stack's parameters and tags as YAML.
//!
//! ```yaml
//! Format: v1
//! Suffix: ze-stack
//! Parameters:
//! - Name: p1
//!   Value: v1
//! Tags: []
//! ```
use crate::api::{Parameter, Stack, StackRequest, Tag};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const FORMAT_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackSnapshot {
    pub format: String,
    /// Stack name the snapshot was taken from.
    pub suffix: String,
    #[serde(default)]
    pub parameters: Vec<NamedValue>,
    #[serde(default)]
    pub tags: Vec<NamedValue>,
}

impl StackSnapshot {
    pub fn from_stack(stack: &Stack) -> Self {
        Self {
            format: FORMAT_VERSION.to_string(),
            suffix: stack.stack_name.clone(),
            parameters: stack
                .parameters
                .iter()
                .map(|param| NamedValue {
                    name: param.parameter_key.clone(),
                    value: param.parameter_value.clone(),
                })
                .collect(),
            tags: stack
                .tags
                .iter()
                .map(|tag| NamedValue {
                    name: tag.key.clone(),
                    value: tag.value.clone(),
                })
                .collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize stack snapshot")
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let snapshot: Self = serde_yaml::from_str(text).context("parse stack snapshot")?;
        if snapshot.format != FORMAT_VERSION {
            return Err(anyhow!(
                "unsupported snapshot format {:?} (expected {FORMAT_VERSION})",
                snapshot.format
            ));
        }
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("load snapshot {}", path.display()))
    }

    /// Use the snapshot's parameters and tags for `request`, replacing any
    /// already set.
    pub fn apply_to(&self, request: &mut StackRequest) {
        request.parameters = self
            .parameters
            .iter()
            .map(|param| Parameter {
                parameter_key: param.name.clone(),
                parameter_value: param.value.clone(),
            })
            .collect();
        request.tags = self
            .tags
            .iter()
            .map(|tag| Tag {
                key: tag.name.clone(),
                value: tag.value.clone(),
            })
            .collect();
    }
}
