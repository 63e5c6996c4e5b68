//! Command line splitting
//!
//! Splits one raw input line into the ordered sub-commands separated by
//! `/`, while keeping slashes that belong to file paths (or anything else a
//! menu asks to protect) inside a single sub-command.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// Everything from ` -f ` / ` --file ` up to the next known file extension
const FILE_ARGUMENT_PATTERN: &str =
    r"( -f | --file ).*?(\.(xlsx|csv|xls|tsv|json|yaml|ini|openbb|ipynb))";

static FILE_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(FILE_ARGUMENT_PATTERN).unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
});

/// Splits input lines on `/` with protected segments
#[derive(Debug, Clone)]
pub struct Tokenizer {
    filter: Regex,
}

impl Tokenizer {
    /// Tokenizer that only protects `-f/--file` path arguments
    pub fn new() -> Self {
        Self {
            filter: FILE_ARGUMENT.clone(),
        }
    }

    /// Tokenizer that additionally protects every match of `custom_filters`
    pub fn with_filters<S: AsRef<str>>(custom_filters: &[S]) -> Result<Self> {
        if custom_filters.is_empty() {
            return Ok(Self::new());
        }

        let custom = custom_filters
            .iter()
            .map(|f| format!("({})", f.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let filter = Regex::new(&format!("({FILE_ARGUMENT_PATTERN})|{custom}"))?;
        Ok(Self { filter })
    }

    /// Split `input` into sub-commands
    pub fn split(&self, input: &str) -> Vec<String> {
        if input == "/" {
            return vec!["home".to_string()];
        }
        if input.is_empty() {
            return Vec::new();
        }

        let (masked, placeholders) = self.mask(input);

        // Timezone names such as America/New_York are never paths
        let mut commands: Vec<String> = if masked.contains("timezone") {
            vec![masked]
        } else {
            masked.split('/').map(str::to_string).collect()
        };

        while commands.last().is_some_and(|c| c.is_empty()) {
            commands.pop();
        }

        for command in &mut commands {
            for (tag, original) in &placeholders {
                if command.contains(tag.as_str()) {
                    *command = command.replace(tag.as_str(), original);
                }
            }
        }

        commands
    }

    /// Replace every protected match with an opaque `{placeholderN}` tag
    fn mask(&self, input: &str) -> (String, Vec<(String, String)>) {
        let mut masked = input.to_string();
        let mut placeholders = Vec::new();
        let mut offset = 0;

        // Resume after the last tag so a filter can never match its own placeholder
        while offset <= masked.len() {
            let Some(found) = self.filter.find_at(&masked, offset) else {
                break;
            };
            if found.start() == found.end() {
                // Step over one character so later matches are still masked
                offset = found.end()
                    + masked[found.end()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let tag = format!("{{placeholder{}}}", placeholders.len() + 1);
            let original = found.as_str().to_string();
            let range = found.range();
            offset = range.start + tag.len();
            masked.replace_range(range, &tag);
            placeholders.push((tag, original));
        }

        (masked, placeholders)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `input` with the built-in file protection plus `custom_filters`.
///
/// Invalid custom patterns are ignored with a warning and only the built-in
/// protection applies.
pub fn split_input<S: AsRef<str>>(input: &str, custom_filters: &[S]) -> Vec<String> {
    match Tokenizer::with_filters(custom_filters) {
        Ok(tokenizer) => tokenizer.split(input),
        Err(e) => {
            warn!("Ignoring custom split filters: {}", e);
            Tokenizer::new().split(input)
        }
    }
}

/// Split one sub-command into words, honouring shell quoting.
///
/// Unbalanced quotes fall back to plain whitespace splitting.
pub fn split_words(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| {
        debug!("Unbalanced quotes in '{}', splitting on whitespace", command);
        command.split_whitespace().map(str::to_string).collect()
    })
}
