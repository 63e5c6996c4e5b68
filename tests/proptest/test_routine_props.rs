//! Property-based tests for routine placeholders
//!
//! Substitution of `$ARGV[n]` and `${key=default}` placeholders and the
//! splitting of `-i` input into routine arguments.

use std::collections::HashMap;

use menuterm::routine::{parse_routine_args, Substitution};
use proptest::prelude::*;

proptest! {
    /// Every positional placeholder takes the matching argument
    #[test]
    fn positional_placeholders_filled(args in prop::collection::vec("[A-Z]{1,5}", 1..5)) {
        let line = (0..args.len())
            .map(|i| format!("$ARGV[{}]", i))
            .collect::<Vec<_>>()
            .join(" ");

        let filled = Substitution::Positional(args.clone()).apply(&line);
        prop_assert_eq!(filled, args.join(" "));
    }

    /// A named placeholder takes its value, or its default when missing
    #[test]
    fn named_placeholder_value_or_default(
        key in "[a-z]{1,6}",
        default in "[A-Z]{1,5}",
        value in prop::option::of("[A-Z]{1,5}"),
    ) {
        let line = format!("load ${{{}={}}}", key, default);
        let mut values = HashMap::new();
        if let Some(value) = &value {
            values.insert(key.clone(), value.clone());
        }

        let filled = Substitution::Named(values).apply(&line);
        let expected = format!("load {}", value.unwrap_or(default));
        prop_assert_eq!(filled, expected);
    }

    /// Lines without placeholders are left alone
    #[test]
    fn plain_lines_unchanged(line in "[a-z0-9 ./-]{0,30}", args in prop::collection::vec("[A-Z]{1,5}", 0..3)) {
        prop_assert_eq!(Substitution::Positional(args).apply(&line), line.clone());
        prop_assert_eq!(Substitution::None.apply(&line), line);
    }

    /// Comma-joined items come back as the same arguments
    #[test]
    fn routine_args_split_on_commas(items in prop::collection::vec("[A-Za-z0-9=]{1,8}", 1..6)) {
        prop_assert_eq!(parse_routine_args(&items.join(",")), items);
    }

    /// A bracketed group is one argument with its commas kept
    #[test]
    fn bracketed_group_kept(head in "[A-Z]{1,5}", group in prop::collection::vec("[a-z]{1,5}", 2..4)) {
        let input = format!("{},[{}]", head, group.join(","));
        prop_assert_eq!(parse_routine_args(&input), vec![head, group.join(",")]);
    }
}
