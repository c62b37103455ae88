//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const STACK_ID: &str = "arn:stack/web/1";
pub const STACK_NAME: &str = "web";

/// Scratch directory holding the transcript and any files a command writes.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub fn transcript(&self, transcript: Value) -> PathBuf {
        self.write("transcript.json", &transcript.to_string())
    }

    /// Run the binary without a terminal on stdin and without polling delays.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_stackwatch"))
            .args(args)
            .current_dir(self.dir.path())
            .env("STACKWATCH_POLL_PAUSE_MS", "0")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .output()
            .expect("run stackwatch")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn stack(status: &str) -> Value {
    json!({
        "stack_id": STACK_ID,
        "stack_name": STACK_NAME,
        "stack_status": status,
        "parameters": [{"parameter_key": "p1", "parameter_value": "v1"}],
        "tags": [{"key": "team", "value": "infra"}],
    })
}

pub fn described(status: &str) -> Value {
    json!({"ok": {"stacks": [stack(status)]}})
}

pub fn missing() -> Value {
    json!({"error": {
        "code": "ValidationError",
        "message": format!("Stack with id {STACK_NAME} does not exist"),
    }})
}

/// One event, stamped far enough ahead to be newer than any operation start.
pub fn event(resource: &str, status: &str, second: u32, reason: Option<&str>) -> Value {
    json!({
        "event_id": format!("{resource}-{status}-{second}"),
        "stack_id": STACK_ID,
        "stack_name": STACK_NAME,
        "logical_resource_id": resource,
        "resource_type": if resource == STACK_NAME {
            "AWS::CloudFormation::Stack"
        } else {
            "AWS::SQS::Queue"
        },
        "resource_status": status,
        "resource_status_reason": reason,
        "timestamp": format!("2099-01-01T00:00:{second:02}Z"),
    })
}

pub fn events(events: Vec<Value>) -> Value {
    json!({"ok": {"stack_events": events}})
}
