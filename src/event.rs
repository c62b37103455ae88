//! Items carried on an operation stream.
use crate::api::{ChangeSet, Stack, StackEvent};
use crate::status::{classify, StateCategory};

/// A polled event together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub event: StackEvent,
    pub category: StateCategory,
}

impl ClassifiedEvent {
    pub fn new(event: StackEvent) -> Self {
        let category = classify(&event.resource_status);
        Self { event, category }
    }
}

/// Stack-level notices raised by a deploy before any API mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackNotice {
    /// The stack can only be replaced: it is deleted and created again.
    Recreate(Stack),
}

/// Caller-initiated termination. Not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub message: String,
}

impl Abort {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Resource(ClassifiedEvent),
    ChangeSetReady(ChangeSet),
    StackNotice(StackNotice),
    Abort(Abort),
}
