//! Command completion and suggestions
//!
//! A [`CompletionIndex`] maps each command of a menu to its flags, and each
//! flag to the values it accepts. The interactive prompt walks it to offer
//! tab completion; [`closest_match`] backs the "did you mean" recovery.

use std::collections::BTreeMap;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Similarity a suggestion needs before it replaces unknown input
pub const SUGGESTION_CUTOFF: f64 = 0.7;

/// Nested token index used for completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionIndex {
    children: BTreeMap<String, CompletionIndex>,
}

impl CompletionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `token` and return its child index
    pub fn insert(&mut self, token: impl Into<String>) -> &mut CompletionIndex {
        self.children.entry(token.into()).or_default()
    }

    /// Replace the children of `token` with `values`
    pub fn set_values<I, S>(&mut self, token: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let child = self.insert(token);
        child.children.clear();
        for value in values {
            child.insert(value);
        }
    }

    pub fn get(&self, token: &str) -> Option<&CompletionIndex> {
        self.children.get(token)
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut CompletionIndex> {
        self.children.get_mut(token)
    }

    /// Tokens at this level, sorted
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Add every token of `other`, merging shared subtrees
    pub fn merge(&mut self, other: &CompletionIndex) {
        for (token, child) in &other.children {
            self.insert(token.clone()).merge(child);
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Candidates for the word being typed at the end of `line`.
    ///
    /// Returns the byte offset where that word starts and the candidates.
    pub fn complete(&self, line: &str) -> (usize, Vec<String>) {
        let words: Vec<&str> = line.split_whitespace().collect();
        let typing_new_word = line.is_empty() || line.ends_with(char::is_whitespace);

        let (context, prefix) = if typing_new_word {
            (&words[..], "")
        } else {
            let (last, rest) = words.split_last().map_or((&"", &[][..]), |(l, r)| (l, r));
            (rest, *last)
        };
        let start = line.len() - prefix.len();

        let candidates: Vec<&str> = match context.split_first() {
            None => self.tokens().collect(),
            Some((command, args)) => match self.get(command) {
                None => Vec::new(),
                Some(flags) => {
                    let value_level = args
                        .last()
                        .and_then(|flag| flags.get(flag))
                        .filter(|values| !values.is_empty());
                    match value_level {
                        Some(values) => values.tokens().collect(),
                        None => flags.tokens().filter(|flag| !args.contains(flag)).collect(),
                    }
                }
            },
        };

        let matches = candidates
            .into_iter()
            .filter(|candidate| candidate.starts_with(prefix))
            .map(str::to_string)
            .collect();

        (start, matches)
    }
}

/// Closest candidate to `word` whose similarity reaches `cutoff`
pub fn closest_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = strsim::normalized_damerau_levenshtein(word, candidate);
        if score >= cutoff && best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// `rustyline` helper completing against the active menu's index
#[derive(Debug, Default)]
pub struct CompletionHelper {
    index: CompletionIndex,
}

impl CompletionHelper {
    pub fn set_index(&mut self, index: CompletionIndex) {
        self.index = index;
    }
}

impl Completer for CompletionHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only the last `/`-separated command is completed
        let head = &line[..pos];
        let offset = head.rfind('/').map_or(0, |i| i + 1);
        let (start, candidates) = self.index.complete(&head[offset..]);

        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();

        Ok((offset + start, pairs))
    }
}

impl Hinter for CompletionHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CompletionHelper {}

impl Validator for CompletionHelper {}

impl Helper for CompletionHelper {}
