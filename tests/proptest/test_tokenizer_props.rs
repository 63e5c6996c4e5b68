//! Property-based tests for input splitting
//!
//! Uses proptest to check that splitting never panics and keeps the
//! sub-commands a user chained together.

use menuterm::tokenizer::split_input;
use proptest::prelude::*;

const NO_FILTERS: &[&str] = &[];

proptest! {
    /// Splitting should never panic on arbitrary input
    #[test]
    fn split_never_panics(input in "\\PC*") {
        let _ = split_input(&input, NO_FILTERS);
    }

    /// Joining commands with `/` and splitting gives them back
    #[test]
    fn chained_commands_round_trip(commands in prop::collection::vec("[a-z][a-z ]{0,9}", 1..6)) {
        let line = commands.join("/");
        prop_assume!(!line.contains("timezone"));

        prop_assert_eq!(split_input(&line, NO_FILTERS), commands);
    }

    /// Never more sub-commands than slashes plus one
    #[test]
    fn segment_count_bounded(input in "[a-z /.-]{0,40}") {
        let segments = split_input(&input, NO_FILTERS);
        let slashes = input.matches('/').count();
        prop_assert!(segments.len() <= slashes + 1);
    }

    /// A `--file` path with a known extension stays in one sub-command
    #[test]
    fn file_paths_preserved(
        dirs in prop::collection::vec("[a-z]{1,8}", 1..4),
        stem in "[a-z]{1,8}",
        ext in prop::sample::select(vec!["csv", "json", "openbb", "xlsx"]),
        next in "[a-z]{1,8}",
    ) {
        let path = format!("/{}/{}.{}", dirs.join("/"), stem, ext);
        let line = format!("exe --file {}/{}", path, next);
        prop_assume!(!line.contains("timezone"));

        let segments = split_input(&line, NO_FILTERS);
        prop_assert_eq!(segments, vec![format!("exe --file {}", path), next]);
    }
}
