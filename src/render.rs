//! Terminal rendering of operation progress.
//!
//! A renderer only draws. Presenters decide what to draw and when, from the
//! events they receive and the resource index they keep.
use crate::api::ChangeSet;
use crate::event::{Abort, ClassifiedEvent, StackNotice};
use crate::resources::Resource;
use crate::status::StateCategory;
use anyhow::Result;
use colored::{Color, Colorize};
use std::io::Write;

pub mod change_set;
pub mod glyph;

use change_set::{sorted_changes, DisplayAction};

pub trait Renderer {
    /// Diff of a computed change set, one row per resource.
    fn change_set(&mut self, change_set: &ChangeSet) -> Result<()>;

    /// Called for every resource event after its resource is updated.
    fn event(&mut self, event: &ClassifiedEvent, resource: &Resource) -> Result<()>;

    fn stack_notice(&mut self, notice: &StackNotice) -> Result<()>;

    /// Return to the start of the resource row before it is redrawn.
    fn clear(&mut self) -> Result<()>;

    /// Draw one resource; fails on a state history with no glyph.
    fn resource(&mut self, resource: &Resource) -> Result<()>;

    fn abort(&mut self, abort: &Abort) -> Result<()>;

    fn done(&mut self) -> Result<()>;
}

/// Single-line progress display: a row of per-resource glyphs redrawn in
/// place, with failure details printed above it.
pub struct ProgressRenderer<W: Write> {
    out: W,
}

impl<W: Write> ProgressRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

fn action_color(action: &DisplayAction) -> Color {
    match action {
        DisplayAction::Add => Color::Green,
        DisplayAction::Modify => Color::Yellow,
        _ => Color::Red,
    }
}

impl<W: Write> Renderer for ProgressRenderer<W> {
    fn change_set(&mut self, change_set: &ChangeSet) -> Result<()> {
        let mut text = format!("Updating {}\n", change_set.stack_name);
        for (action, change) in sorted_changes(&change_set.changes) {
            let label = format!("{:<10}", action.label()).color(action_color(&action));
            text.push_str(&format!(
                "{}[{}] {} [{}]\n",
                change.logical_resource_id,
                change.resource_type,
                label,
                change.scope.join(", ")
            ));
        }
        self.write(&text)
    }

    fn event(&mut self, event: &ClassifiedEvent, resource: &Resource) -> Result<()> {
        if resource.latest_state() != Some(StateCategory::Failure) {
            return Ok(());
        }
        let line = format!(
            "{}  {}[{}] {}",
            event.event.timestamp.format("%H:%M:%S%z"),
            resource.logical_resource_id,
            resource.resource_type,
            resource.resource_status_reason.as_deref().unwrap_or_default()
        );
        self.write(&format!("\r{}\n", line.red()))
    }

    fn stack_notice(&mut self, notice: &StackNotice) -> Result<()> {
        match notice {
            StackNotice::Recreate(stack) => {
                let line = format!("Will delete and re-create {}", stack.stack_name);
                self.write(&format!("{}\n", line.red()))
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        self.write("\r")
    }

    fn resource(&mut self, resource: &Resource) -> Result<()> {
        let glyph = glyph::for_resource(resource)?;
        let cell = glyph.symbol.as_str().white().on_color(glyph.background);
        self.write(&cell.to_string())
    }

    fn abort(&mut self, abort: &Abort) -> Result<()> {
        self.write(&format!("{}\n", abort.message.red()))
    }

    fn done(&mut self) -> Result<()> {
        self.write(&"\nDone.\n".green().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ResourceChange, Stack, StackEvent};
    use crate::error::RenderDefect;
    use regex::Regex;

    fn plain(renderer: ProgressRenderer<Vec<u8>>) -> String {
        let raw = String::from_utf8(renderer.into_inner()).expect("utf8");
        let ansi = Regex::new(r"\x1b\[[0-9;]*m").expect("ansi regex");
        ansi.replace_all(&raw, "").into_owned()
    }

    fn failed_event() -> ClassifiedEvent {
        ClassifiedEvent::new(StackEvent {
            event_id: "e1".to_string(),
            stack_id: "ze-id".to_string(),
            stack_name: "ze-stack".to_string(),
            logical_resource_id: "queue".to_string(),
            physical_resource_id: None,
            resource_type: "AWS::SQS::Queue".to_string(),
            resource_status: "CREATE_FAILED".to_string(),
            resource_status_reason: Some("Queue name already taken".to_string()),
            timestamp: "2013-08-23T01:02:03Z".parse().expect("timestamp"),
        })
    }

    fn resource(states: &[StateCategory]) -> Resource {
        let event = failed_event();
        Resource {
            logical_resource_id: event.event.logical_resource_id,
            resource_type: event.event.resource_type,
            resource_status_reason: event.event.resource_status_reason,
            states: states.to_vec(),
        }
    }

    #[test]
    fn change_set_lists_sorted_rows() {
        let change = |id: &str, action: &str, replacement: Option<&str>| ResourceChange {
            logical_resource_id: id.to_string(),
            resource_type: "AWS::SQS::Queue".to_string(),
            action: action.to_string(),
            replacement: replacement.map(str::to_string),
            scope: vec!["Properties".to_string(), "Tags".to_string()],
        };
        let change_set = ChangeSet {
            change_set_id: "cs".to_string(),
            stack_id: "ze-id".to_string(),
            stack_name: "ze-stack".to_string(),
            status: "CREATE_COMPLETE".to_string(),
            status_reason: None,
            changes: vec![
                change("b", "Modify", Some("True")),
                change("a", "Add", None),
            ],
        };
        let mut renderer = ProgressRenderer::new(Vec::new());
        renderer.change_set(&change_set).expect("render");
        assert_eq!(
            plain(renderer),
            "Updating ze-stack\n\
             a[AWS::SQS::Queue] Add        [Properties, Tags]\n\
             b[AWS::SQS::Queue] Replace!   [Properties, Tags]\n"
        );
    }

    #[test]
    fn failure_line_only_for_failed_resources() {
        let mut renderer = ProgressRenderer::new(Vec::new());
        renderer
            .event(&failed_event(), &resource(&[StateCategory::InProgress]))
            .expect("render");
        renderer
            .event(&failed_event(), &resource(&[StateCategory::Failure]))
            .expect("render");
        assert_eq!(
            plain(renderer),
            "\r01:02:03+0000  queue[AWS::SQS::Queue] Queue name already taken\n"
        );
    }

    #[test]
    fn resource_row_and_banners() {
        let mut renderer = ProgressRenderer::new(Vec::new());
        renderer.clear().expect("render");
        renderer.resource(&resource(&[StateCategory::Success])).expect("render");
        renderer.resource(&resource(&[StateCategory::InProgress])).expect("render");
        renderer.abort(&Abort::new("User abort!")).expect("render");
        renderer.done().expect("render");
        assert_eq!(plain(renderer), "\r+.User abort!\n\nDone.\n");
    }

    #[test]
    fn recreate_warning_names_the_stack() {
        let stack = Stack {
            stack_id: "ze-id".to_string(),
            stack_name: "ze-stack".to_string(),
            stack_status: "ROLLBACK_COMPLETE".to_string(),
            stack_status_reason: None,
            parameters: Vec::new(),
            tags: Vec::new(),
        };
        let mut renderer = ProgressRenderer::new(Vec::new());
        renderer
            .stack_notice(&StackNotice::Recreate(stack))
            .expect("render");
        assert_eq!(plain(renderer), "Will delete and re-create ze-stack\n");
    }

    #[test]
    fn unmapped_history_fails_loudly() {
        let mut renderer = ProgressRenderer::new(Vec::new());
        let states = [
            StateCategory::Success,
            StateCategory::Success,
            StateCategory::InProgress,
        ];
        let err = renderer.resource(&resource(&states)).expect_err("defect");
        let defect = err.downcast_ref::<RenderDefect>().expect("render defect");
        assert_eq!(defect.logical_resource_id, "queue");
        assert!(plain(renderer).is_empty());
    }
}
