//! Unit Tests for Command Schemas
//!
//! Shared `--export`, `--raw` and `--limit` options, default flags and the
//! handling of tokens that cannot be interpreted.

use clap::{Arg, ArgAction};
use menuterm::config::Preferences;
use menuterm::export::ExportFormat;
use menuterm::{CommandSchema, Console, DispatchError};

fn words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn notes_schema() -> CommandSchema {
    CommandSchema::new("notes", "Show saved notes")
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_parser(["date", "text"])
                .default_value("date"),
        )
        .arg(Arg::new("reverse").short('r').long("reverse").action(ArgAction::SetTrue))
        .with_export(ExportFormat::DATA)
        .with_raw()
        .with_limit(10)
}

#[test]
fn test_defaults_applied() {
    let (mut console, output) = Console::buffered();
    let parsed = notes_schema()
        .parse(&[], &mut console, &Preferences::default())
        .unwrap();

    assert_eq!(parsed.limit, Some(10));
    assert!(!parsed.raw);
    assert!(!parsed.is_exporting());
    assert!(!parsed.get_flag("reverse"));
    assert_eq!(parsed.get_string("sort").as_deref(), Some("date"));
    assert!(output.contents().is_empty());
}

#[test]
fn test_export_formats_deduplicated() {
    let (mut console, _) = Console::buffered();
    let parsed = notes_schema()
        .parse(&words("--export csv,json --export csv"), &mut console, &Preferences::default())
        .unwrap();

    assert_eq!(parsed.export, vec![ExportFormat::Csv, ExportFormat::Json]);
}

#[test]
fn test_sheet_name_with_xlsx() {
    let (mut console, _) = Console::buffered();
    let parsed = notes_schema()
        .parse(
            &words("--export xlsx --sheet-name Q1 notes"),
            &mut console,
            &Preferences::default(),
        )
        .unwrap();

    assert_eq!(parsed.export, vec![ExportFormat::Xlsx]);
    assert_eq!(parsed.sheet_name.as_deref(), Some("Q1 notes"));
}

#[test]
fn test_limit_must_be_positive() {
    let (mut console, _) = Console::buffered();
    let result = notes_schema().parse(&words("--limit 0"), &mut console, &Preferences::default());
    assert!(matches!(result, Err(DispatchError::ParseFailed { .. })));

    let parsed = notes_schema()
        .parse(&words("-l 3 --raw"), &mut console, &Preferences::default())
        .unwrap();
    assert_eq!(parsed.limit, Some(3));
    assert!(parsed.raw);
}

#[test]
fn test_unknown_tokens_collected() {
    let (mut console, output) = Console::buffered();
    let parsed = notes_schema()
        .parse(&words("--revers -r"), &mut console, &Preferences::default())
        .unwrap();

    assert_eq!(parsed.unknown, vec!["--revers"]);
    assert!(parsed.get_flag("reverse"));
    assert!(output.contents().contains("Did you mean '--reverse'?"));
}

#[test]
fn test_invalid_choice_fails() {
    let (mut console, output) = Console::buffered();
    let result = notes_schema().parse(&words("--sort size"), &mut console, &Preferences::default());
    assert!(matches!(result, Err(DispatchError::ParseFailed { .. })));
    assert!(output.contents().contains("size"));
}

#[test]
fn test_schema_without_export_rejects_flag() {
    let schema = CommandSchema::new("load", "Load a ticker").arg(Arg::new("ticker").short('t'));
    assert!(schema.export_formats().is_empty());
    assert!(!schema.flags().contains(&"--export".to_string()));

    let (mut console, _) = Console::buffered();
    let parsed = schema
        .parse(&words("-t AAPL --export"), &mut console, &Preferences::default())
        .unwrap();
    assert!(!parsed.is_exporting());
    assert_eq!(parsed.unknown, vec!["--export"]);
    assert_eq!(parsed.get_string("ticker").as_deref(), Some("AAPL"));
}

#[test]
fn test_completion_tree() {
    let index = notes_schema().completion();

    let sort_values: Vec<&str> = index.get("--sort").unwrap().tokens().collect();
    assert_eq!(sort_values.len(), 2);
    assert!(sort_values.contains(&"date"));
    assert!(index.get("--raw").unwrap().is_empty());
    assert!(index.get("-l").is_some());
    assert!(index.get("--help").is_some());
}

#[test]
fn test_usage_mentions_flags() {
    let usage = notes_schema().usage();
    assert!(usage.contains("--export"));
    assert!(usage.contains("--limit"));
    assert!(usage.contains("Show saved notes"));
}
