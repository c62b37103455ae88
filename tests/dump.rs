//! `stackwatch dump` against recorded lookups.

mod common;

use common::{described, missing, stderr, stdout, Workspace};
use serde_json::json;
use std::fs;

#[test]
fn dump_prints_snapshot_for_existing_stack() {
    let workspace = Workspace::new();
    let transcript = workspace.transcript(json!({
        "describe_stacks": [described("UPDATE_COMPLETE")],
    }));

    let output = workspace.run(&[
        "dump",
        "--stack",
        "web",
        "--transcript",
        transcript.to_str().expect("utf8 path"),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Format: v1\n\
         Suffix: web\n\
         Parameters:\n\
         - Name: p1\n  Value: v1\n\
         Tags:\n\
         - Name: team\n  Value: infra\n"
    );
}

#[test]
fn dump_writes_snapshot_file_that_deploy_accepts() {
    let workspace = Workspace::new();
    let transcript = workspace.transcript(json!({
        "describe_stacks": [described("CREATE_COMPLETE")],
    }));
    let out = workspace.path("web.yml");

    let output = workspace.run(&[
        "dump",
        "--stack",
        "web",
        "--transcript",
        transcript.to_str().expect("utf8 path"),
        "--out",
        out.to_str().expect("utf8 path"),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let written = fs::read_to_string(&out).expect("snapshot written");
    assert!(written.starts_with("Format: v1\n"));
    assert!(written.contains("- Name: p1\n  Value: v1\n"));
}

#[test]
fn dump_of_missing_stack_fails_quietly() {
    let workspace = Workspace::new();
    let transcript = workspace.transcript(json!({
        "describe_stacks": [missing()],
    }));

    let output = workspace.run(&[
        "dump",
        "--stack",
        "web",
        "--transcript",
        transcript.to_str().expect("utf8 path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output).trim(), "No such stack web");
    assert!(stdout(&output).is_empty());
}

#[test]
fn dump_surfaces_transport_errors() {
    let workspace = Workspace::new();
    let transcript = workspace.transcript(json!({
        "describe_stacks": [{"error": {"code": "Throttling", "message": "Rate exceeded"}}],
    }));

    let output = workspace.run(&[
        "dump",
        "--stack",
        "web",
        "--transcript",
        transcript.to_str().expect("utf8 path"),
    ]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Rate exceeded"));
}
