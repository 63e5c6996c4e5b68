//! Integration Tests for Session Recording
//!
//! `record` / `stop` driven through the engine, saving routines locally for
//! guests and uploading them for signed-in users.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::fs;

use menuterm::hub::UploadStatus;
use menuterm::ScriptedPrompt;
use test_utils::{MockHub, TestSession};

const RECORD_MY_ROUTINE: &str = r#"record -n "My Routine" --tag1 earnings"#;
const FOUR_COMMANDS: [&str; 4] = ["stocks", "load AAPL", "dd", "notes"];

fn signed_in(hub: &MockHub, prompt: ScriptedPrompt) -> TestSession {
    TestSession::with(
        |config| {
            config.user.username = Some("analyst".into());
            config.user.token = Some("token".into());
        },
        prompt,
        Some(Box::new(hub.clone())),
    )
}

fn record_session(session: &mut TestSession) {
    session.run(&[RECORD_MY_ROUTINE]);
    session.run(&FOUR_COMMANDS);
    session.run(&["stop"]);
}

#[test]
fn test_early_stop_keeps_recording() {
    let hub = MockHub::default();
    let mut session = signed_in(&hub, ScriptedPrompt::default());
    session.run(&["record -n Short", "stocks", "load AAPL", "stop"]);

    let recorder = &session.engine.state().recorder;
    assert!(recorder.is_active());
    assert_eq!(recorder.lines(), &["stocks", "load AAPL"]);
    assert!(hub.requests().is_empty());
    assert!(!session.routines_dir().exists());
    assert!(session.output.contents().contains("Still recording"));

    session.run(&["dd", "notes", "stop"]);
    assert!(!session.engine.state().recorder.is_active());
    let requests = hub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].script, "stocks\nload AAPL\ndd\nnotes");
}

#[test]
fn test_guest_recording_writes_routine_file() {
    let mut session = TestSession::new();
    record_session(&mut session);

    let path = session.routines_dir().join("My_Routine.openbb");
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "# Title: My Routine\n# Tags: earnings\n# Description: \n\nstocks\nload AAPL\ndd\nnotes\n"
    );

    let (header, body) = content.split_once("\n\n").unwrap();
    assert!(header.contains("My Routine"));
    assert!(header.contains("earnings"));
    assert_eq!(body.lines().count(), 4);
    assert!(!session.engine.state().recorder.is_active());
}

#[test]
fn test_existing_routine_kept_when_overwrite_declined() {
    let mut session = TestSession::with(|_| {}, ScriptedPrompt::default().with_answers([false]), None);
    fs::create_dir_all(session.routines_dir()).unwrap();
    let existing = session.routines_dir().join("My_Routine.openbb");
    fs::write(&existing, "old").unwrap();

    record_session(&mut session);

    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
    let names: Vec<String> = fs::read_dir(session.routines_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names
        .iter()
        .any(|name| name.starts_with("My_Routine_") && name.ends_with(".openbb")));
}

#[test]
fn test_existing_routine_overwritten_when_confirmed() {
    let mut session = TestSession::with(|_| {}, ScriptedPrompt::default().with_answers([true]), None);
    fs::create_dir_all(session.routines_dir()).unwrap();
    let existing = session.routines_dir().join("My_Routine.openbb");
    fs::write(&existing, "old").unwrap();

    record_session(&mut session);

    assert!(fs::read_to_string(&existing).unwrap().starts_with("# Title: My Routine"));
    assert_eq!(fs::read_dir(session.routines_dir()).unwrap().count(), 1);
}

#[test]
fn test_signed_in_recording_uploads() {
    let hub = MockHub::new([UploadStatus::Created {
        url: Some("https://hub.example/r/1".into()),
    }]);
    let mut session = signed_in(&hub, ScriptedPrompt::default());
    record_session(&mut session);

    let requests = hub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "My Routine");
    assert_eq!(requests[0].tags, vec!["earnings".to_string()]);
    assert_eq!(requests[0].script, "stocks\nload AAPL\ndd\nnotes");
    assert!(!session.routines_dir().exists());
    assert!(session.output.contents().contains("https://hub.example/r/1"));
}

#[test]
fn test_upload_conflict_retried_with_override() {
    let hub = MockHub::new([UploadStatus::Conflict, UploadStatus::Created { url: None }]);
    let mut session = signed_in(&hub, ScriptedPrompt::default().with_answers([true]));
    record_session(&mut session);

    let requests = hub.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].override_existing);
    assert!(requests[1].override_existing);
    assert!(session.output.contents().contains("Successfully uploaded"));
}

#[test]
fn test_local_flag_skips_upload() {
    let hub = MockHub::default();
    let mut session = signed_in(&hub, ScriptedPrompt::default());
    session.run(&["record -n Local Copy --local"]);
    session.run(&FOUR_COMMANDS);
    session.run(&["stop"]);

    assert!(hub.requests().is_empty());
    let content = fs::read_to_string(session.routines_dir().join("Local_Copy.openbb")).unwrap();
    assert!(content.contains("# Author: analyst"));
}

#[test]
fn test_recording_started_in_submenu_and_leaving_it() {
    let mut session = TestSession::new();
    session.run(&["stocks", "record -n Sub", "load AAPL", "dd", "notes", ".."]);
    assert_eq!(
        session.engine.state().recorder.lines(),
        &["load AAPL", "dd", "notes", ".."]
    );
    session.run(&["stop"]);

    let content = fs::read_to_string(session.routines_dir().join("Sub.openbb")).unwrap();
    let body = content.split_once("\n\n").unwrap().1;
    assert_eq!(body, "/stocks\nload AAPL\ndd\nnotes\n..\n");
}

#[test]
fn test_invalid_tag_does_not_start_recording() {
    let mut session = TestSession::new();
    session.run(&["record -n Bad --tag1 bogus"]);
    assert!(!session.engine.state().recorder.is_active());

    session.run(&["record -n Bad-Title"]);
    assert!(!session.engine.state().recorder.is_active());
    assert!(session
        .output
        .contents()
        .contains("should only contain letters, numbers and spaces"));
}

#[test]
fn test_stop_without_recording() {
    let mut session = TestSession::new();
    session.run(&["stop"]);
    assert!(session.output.contents().contains("No routine is being recorded"));
}

#[test]
fn test_reset_replay_is_not_recorded() {
    let mut session = TestSession::new();
    session.run(&["stocks", "load AAPL", "record -n Reset", "load MSFT", "reset"]);
    assert_eq!(session.path(), "/stocks/");
    assert_eq!(session.engine.state().recorder.lines(), &["load MSFT"]);

    session.run(&["dd", "notes", "note hello", "stop"]);
    let content = fs::read_to_string(session.routines_dir().join("Reset.openbb")).unwrap();
    let body = content.split_once("\n\n").unwrap().1;
    assert_eq!(body, "/stocks\nload MSFT\ndd\nnotes\nnote hello\n");
}
