//! Per-resource state history built from an operation's event stream.
use crate::event::ClassifiedEvent;
use crate::status::StateCategory;
use std::collections::HashMap;

/// What the display knows about one logical resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub logical_resource_id: String,
    pub resource_type: String,
    pub resource_status_reason: Option<String>,
    /// Categories seen so far, with at most one trailing in-progress entry.
    pub states: Vec<StateCategory>,
}

impl Resource {
    fn new(event: &ClassifiedEvent) -> Self {
        let event = &event.event;
        Self {
            logical_resource_id: event.logical_resource_id.clone(),
            resource_type: event.resource_type.clone(),
            resource_status_reason: event.resource_status_reason.clone(),
            states: Vec::new(),
        }
    }

    pub fn latest_state(&self) -> Option<StateCategory> {
        self.states.last().copied()
    }

    fn apply(&mut self, classified: &ClassifiedEvent) {
        let event = &classified.event;
        if !event.resource_type.is_empty() {
            self.resource_type = event.resource_type.clone();
        }
        self.resource_status_reason = event.resource_status_reason.clone();

        if self.latest_state() == Some(StateCategory::InProgress) {
            self.states.pop();
        }
        self.states.push(classified.category);
    }
}

/// Resources in first-seen order. Entries are never removed during a run.
#[derive(Debug, Default)]
pub struct ResourceStateAggregator {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl ResourceStateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into its resource's history and return the resource.
    pub fn record(&mut self, event: &ClassifiedEvent) -> &Resource {
        let id = &event.event.logical_resource_id;
        let pos = match self.index.get(id) {
            Some(pos) => *pos,
            None => {
                let pos = self.resources.len();
                self.resources.push(Resource::new(event));
                self.index.insert(id.clone(), pos);
                pos
            }
        };
        let resource = &mut self.resources[pos];
        resource.apply(event);
        resource
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}
