//! Integration Tests for Error Recovery
//!
//! Unknown commands, misspellings and bad arguments must never stop the
//! engine; it reports, suggests a replacement when one is close enough, and
//! keeps going.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use menuterm::menu::EngineStatus;
use test_utils::{queue_of, TestSession};

#[test]
fn test_misspelled_command_is_replaced() {
    let mut session = TestSession::new();
    session.engine.queue_lines(["hlep"]);
    session.engine.step();

    let output = session.output.contents();
    assert!(output.contains("The command 'hlep' doesn't exist on the / menu."));
    assert!(output.contains("Replacing by 'help'."));
    assert_eq!(queue_of(&session.engine), vec!["help"]);

    session.engine.step();
    assert!(session.output.contents().contains("Home (/)"));
}

#[test]
fn test_unknown_command_without_match() {
    let mut session = TestSession::new();
    session.run(&["zzzzz"]);

    let output = session.output.contents();
    assert_eq!(output, "The command 'zzzzz' doesn't exist on the / menu.\n");
    assert!(queue_of(&session.engine).is_empty());
    assert_eq!(session.engine.status(), EngineStatus::AwaitingInput);
}

#[test]
fn test_replacement_keeps_arguments() {
    let mut session = TestSession::new();
    session.run(&["stocks"]);

    session.engine.queue_lines(["lod AAPL"]);
    session.engine.step();
    assert_eq!(queue_of(&session.engine), vec!["load AAPL"]);

    session.engine.step();
    assert!(session.engine.state().results.lookup("AAPL").is_some());
}

#[test]
fn test_missing_required_argument_stays() {
    let mut session = TestSession::new();
    session.run(&["stocks", "load"]);

    assert_eq!(session.path(), "/stocks/");
    assert!(session.engine.state().results.is_empty());
    assert!(session.output.contents().contains("required"));
}

#[test]
fn test_unknown_flags_are_reported_and_ignored() {
    let mut session = TestSession::new();
    session.run(&["stocks/load AAPL/dd", "notes --bogus --expor"]);

    let output = session.output.contents();
    assert!(output.contains("The following args couldn't be interpreted"));
    assert!(output.contains("--bogus"));
    assert!(output.contains("Did you mean '--export'?"));
    assert!(output.contains("No notes for AAPL yet."));
}

#[test]
fn test_command_help_flag() {
    let mut session = TestSession::new();
    session.run(&["stocks"]);

    session.run(&["load -h"]);
    assert!(session.output.contents().contains("Load a ticker"));
    assert!(session.engine.state().results.is_empty());
}

#[test]
fn test_sheet_name_requires_xlsx_export() {
    let mut session = TestSession::new();
    session.run(&["stocks/load AAPL/dd"]);

    session.run(&["notes --export csv --sheet-name summary"]);
    let output = session.output.contents();
    assert!(output.contains("Use --sheet-name only together with an xlsx --export"));
    assert!(!output.contains("No notes for AAPL yet."));
}

#[test]
fn test_unsupported_export_format_continues() {
    let mut session = TestSession::new();
    session.run(&["stocks/load AAPL/dd", "note first", "notes --export xlsx", "notes"]);

    let output = session.output.contents();
    assert!(output.contains("Exporting to xlsx is not available"));
    assert_eq!(session.path(), "/stocks/dd/");
    assert_eq!(session.engine.status(), EngineStatus::AwaitingInput);
}

#[test]
fn test_invalid_export_value_rejected() {
    let mut session = TestSession::new();
    session.run(&["stocks/load AAPL/dd"]);

    session.run(&["notes --export pdf"]);
    assert!(!session.output.contents().contains("No notes for AAPL yet."));
    assert_eq!(session.path(), "/stocks/dd/");
}
