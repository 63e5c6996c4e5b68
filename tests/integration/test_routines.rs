//! Integration Tests for Routine Scripts
//!
//! Routine files loaded from disk, placeholders filled, and the result fed to
//! the engine either at startup or through the `exe` command.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use menuterm::menu::EngineStatus;
use menuterm::routine::{instruction, parse_routine_args, RoutineRunner, RoutineScript, Substitution};
use menuterm::Error;
use tempfile::TempDir;
use test_utils::{drain, TestSession};

fn write_routine(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_positional_argument_substitution() {
    let dir = TempDir::new().unwrap();
    let path = write_routine(&dir, "load.openbb", "load $ARGV[0]\n");

    let script = RoutineScript::from_path(&path).unwrap();
    let lines = script.render(&Substitution::Positional(vec!["AAPL".to_string()]));
    assert_eq!(lines, vec!["load AAPL"]);
    assert_eq!(instruction(&lines), "/load AAPL");
}

#[test]
fn test_named_argument_default() {
    let dir = TempDir::new().unwrap();
    let path = write_routine(&dir, "load.openbb", "load ${sym=SPY}\n");

    let script = RoutineScript::from_path(&path).unwrap();
    assert_eq!(
        script.render(&Substitution::Named(HashMap::new())),
        vec!["load SPY"]
    );

    let args = Substitution::from_args(parse_routine_args("sym=QQQ"));
    assert_eq!(script.render(&args), vec!["load QQQ"]);
}

#[test]
fn test_comments_and_resets_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_routine(
        &dir,
        "daily.openbb",
        "# Title: Daily\n# Tags: stocks\n\nstocks\nreset\nload AAPL   \nr\n",
    );

    let script = RoutineScript::from_path(&path).unwrap();
    assert_eq!(script.lines(), &["stocks".to_string(), "load AAPL".to_string()]);
}

#[test]
fn test_prepared_routine_runs_in_test_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_routine(&dir, "daily.openbb", "stocks\nload $ARGV[0]\ndd\nnote $ARGV[1]\n");
    let args = Substitution::from_args(parse_routine_args("MSFT,[beat,raised]"));

    let prepared = RoutineRunner::prepare(&path, &args, true).unwrap();
    assert_eq!(
        prepared.queue,
        vec!["/stocks/load MSFT/dd/note beat,raised", "exit"]
    );

    let mut session = TestSession::new();
    session.engine.queue_lines(prepared.queue);
    session.engine.run();

    assert_eq!(session.engine.status(), EngineStatus::Exited);
    let output = session.output.contents();
    assert!(output.contains("Loaded MSFT"));
    assert!(output.contains("Note 1 saved for MSFT"));
}

#[test]
fn test_export_directive_creates_directory() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("reports").join("today");
    let path = write_routine(
        &dir,
        "export.openbb",
        &format!("export {}\nstocks\n", export.display()),
    );

    let prepared = RoutineRunner::prepare(&path, &Substitution::None, false).unwrap();
    assert!(export.is_dir());
    assert_eq!(prepared.export_directory, Some(export));
    assert_eq!(prepared.queue, vec!["/stocks"]);
}

#[test]
fn test_missing_routine_reported() {
    let dir = TempDir::new().unwrap();
    let result = RoutineRunner::prepare(&dir.path().join("nope.openbb"), &Substitution::None, true);
    assert!(matches!(result, Err(Error::RoutineNotFound { .. })));
}

#[test]
fn test_exe_runs_routine_from_routines_folder() {
    let mut session = TestSession::new();
    fs::create_dir_all(session.routines_dir()).unwrap();
    fs::write(
        session.routines_dir().join("daily.openbb"),
        "stocks\nload $ARGV[0]\ndd\n",
    )
    .unwrap();

    session.engine.queue_lines(["exe daily -i NVDA"]);
    session.engine.step();
    assert_eq!(
        test_utils::queue_of(&session.engine),
        vec!["/stocks/load NVDA/dd"]
    );

    drain(&mut session.engine);
    assert_eq!(session.path(), "/stocks/dd/");
    assert!(session.engine.state().results.lookup("NVDA").is_some());
}

#[test]
fn test_exe_with_file_flag_and_path() {
    let mut session = TestSession::new();
    let routine = session.dir.path().join("scripts").join("named.openbb");
    fs::create_dir_all(routine.parent().unwrap()).unwrap();
    fs::write(&routine, "stocks\nload ${sym=SPY}\n").unwrap();

    let line = format!("stocks/../exe --file {}/dd", routine.display());
    session.run(&[&line]);

    // The routine runs before the `dd` queued behind it
    assert_eq!(session.path(), "/stocks/dd/");
    assert!(session.engine.state().results.lookup("SPY").is_some());
}

#[test]
fn test_exe_missing_routine_stays() {
    let mut session = TestSession::new();
    session.run(&["exe nothing_here"]);

    assert_eq!(session.path(), "/");
    assert!(session.output.contents().contains("not found"));
}
