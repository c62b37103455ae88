//! Watermark-based deduplication of polled events.
//!
//! Every poll returns the stack's whole recent history, so each batch is a
//! superset of the previous one. Identity is the event timestamp: anything at
//! or before the watermark has already been delivered (or predates the
//! operation) and is dropped.
use crate::api::StackEvent;
use chrono::{DateTime, Utc};

/// Watermark of the newest delivered event for one operation.
///
/// The default cursor has no watermark and accepts every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollCursor {
    watermark: Option<DateTime<Utc>>,
}

impl PollCursor {
    /// A cursor that ignores history at or before `since`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            watermark: Some(since),
        }
    }

    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Keep only events strictly newer than the watermark, oldest first, and
    /// advance the watermark to the newest timestamp in the batch.
    ///
    /// Ties on timestamp keep the order in which the batch listed them.
    pub fn advance(&mut self, batch: Vec<StackEvent>) -> Vec<StackEvent> {
        let mut fresh: Vec<StackEvent> = match self.watermark {
            Some(mark) => batch
                .into_iter()
                .filter(|event| event.timestamp > mark)
                .collect(),
            None => batch,
        };
        fresh.sort_by_key(|event| event.timestamp);
        if let Some(newest) = fresh.last() {
            self.watermark = Some(newest.timestamp);
        }
        fresh
    }
}
