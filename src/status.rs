//! Status classification for raw stack and resource status strings.
//!
//! The classifier is total: a status it does not recognise is a failure, so a
//! new terminal state reported by the API can never leave a poll loop spinning.
use std::fmt;

/// Coarse lifecycle category of a raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateCategory {
    InProgress,
    Success,
    Failure,
    Deleted,
}

impl StateCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw status such as `UPDATE_ROLLBACK_COMPLETE` to its category.
pub fn classify(status: &str) -> StateCategory {
    if status.contains("IN_PROGRESS") {
        return StateCategory::InProgress;
    }
    if status.ends_with("ROLLBACK_COMPLETE") {
        return StateCategory::Failure;
    }
    if status.ends_with("DELETE_COMPLETE") {
        return StateCategory::Deleted;
    }
    if status.ends_with("_COMPLETE") {
        return StateCategory::Success;
    }
    // `_FAILED` and anything unrecognised.
    StateCategory::Failure
}
