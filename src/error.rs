//! Error taxonomy for stack operations.
//!
//! Orchestration-level failures (rollbacks, failed resources) are not errors:
//! they arrive as failure-classified events on a normally completing stream.
//! The types here cover everything that ends a stream abnormally.
use crate::status::StateCategory;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Result alias for operations against the stack API.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure reported by the underlying stack API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The stack or change set does not exist.
    #[error("{message}")]
    NotFound { message: String },

    /// Any other API failure. Never retried here.
    #[error("{operation} failed ({code}): {message}")]
    Transport {
        operation: &'static str,
        code: String,
        message: String,
    },
}

impl ApiError {
    /// Classify a service error reply.
    ///
    /// The service reports absence as a generic validation error, so the
    /// message is the only reliable signal.
    pub fn from_service(operation: &'static str, code: &str, message: &str) -> Self {
        if code == "ValidationError" && does_not_exist().is_match(message) {
            return Self::NotFound {
                message: message.to_string(),
            };
        }
        Self::Transport {
            operation,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn does_not_exist() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bdoes not exist\b").expect("regex for missing stacks"))
}

/// A resource state history with no entry in the glyph table. Fatal to the
/// presentation, reported through the presenter's error banner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected states {states:?} for resource {logical_resource_id}")]
pub struct RenderDefect {
    pub logical_resource_id: String,
    pub states: Vec<StateCategory>,
}

/// Abnormal termination of an operation stream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { waited: Duration, what: &'static str },

    #[error("failed to start async runtime")]
    Runtime(#[source] std::io::Error),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_not_found())
    }
}
