//! Routine scripts
//!
//! A routine is a plain text file with one terminal command per line. Lines
//! containing `#` are comments. The first line may be an `export <dir>`
//! directive. Commands may carry `$ARGV[n]` or `${key=default}`
//! placeholders, filled from the `-i/--input` arguments.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

static NAMED_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)=([^}]*)\}")
        .unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
});

const EXPORT_DIRECTIVE: &str = "export ";

/// How placeholders are filled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Substitution {
    #[default]
    None,
    /// `$ARGV[i]` is replaced by the i-th argument
    Positional(Vec<String>),
    /// `${key=default}` is replaced by the value of `key`, or `default`
    Named(HashMap<String, String>),
}

impl Substitution {
    /// Named when every argument is `key=value`, positional otherwise
    pub fn from_args(args: Vec<String>) -> Self {
        if args.is_empty() {
            return Substitution::None;
        }

        if args.iter().all(|arg| arg.contains('=')) {
            let map = args
                .iter()
                .filter_map(|arg| arg.split_once('='))
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .collect();
            Substitution::Named(map)
        } else {
            Substitution::Positional(args)
        }
    }

    /// Fill the placeholders of one line.
    ///
    /// `${key=default}` placeholders without a value take their default.
    pub fn apply(&self, line: &str) -> String {
        match self {
            Substitution::None => fill_defaults(line, None),
            Substitution::Positional(args) => {
                let line = args.iter().enumerate().fold(line.to_string(), |acc, (i, arg)| {
                    acc.replace(&format!("$ARGV[{}]", i), arg)
                });
                fill_defaults(&line, None)
            }
            Substitution::Named(values) => fill_defaults(line, Some(values)),
        }
    }
}

fn fill_defaults(line: &str, values: Option<&HashMap<String, String>>) -> String {
    NAMED_PLACEHOLDER
        .replace_all(line, |caps: &Captures<'_>| {
            values
                .and_then(|values| values.get(&caps[1]))
                .filter(|value| !value.is_empty())
                .cloned()
                .unwrap_or_else(|| caps[2].to_string())
        })
        .into_owned()
}

/// Split `-i` input on commas; `[a,b]` stays one argument `a,b`
pub fn parse_routine_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in input.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => args.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    args.push(current);

    args.into_iter()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect()
}

/// Parsed routine file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineScript {
    path: PathBuf,
    lines: Vec<String>,
    export_directory: Option<PathBuf>,
}

impl RoutineScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::RoutineNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Parse routine text read from `path`
    pub fn parse(path: &Path, content: &str) -> Self {
        let mut lines: Vec<String> = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.contains('#'))
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !matches!(line.trim(), "r" | "reset"))
            .map(str::to_string)
            .collect();

        let export_directory = match lines.first() {
            Some(first) if first.trim_start().starts_with(EXPORT_DIRECTIVE) => {
                let dir = first.trim_start()[EXPORT_DIRECTIVE.len()..].trim().to_string();
                lines.remove(0);
                Some(PathBuf::from(dir)).filter(|dir| !dir.as_os_str().is_empty())
            }
            _ => None,
        };

        Self {
            path: path.to_path_buf(),
            lines,
            export_directory,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commands, placeholders untouched
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Target of a leading `export <dir>` directive
    pub fn export_directory(&self) -> Option<&Path> {
        self.export_directory.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Commands with placeholders filled
    pub fn render(&self, substitution: &Substitution) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| substitution.apply(line))
            .collect()
    }
}

/// One absolute input line running `lines` from the root menu
pub fn instruction<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}

/// A routine ready to be queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRoutine {
    /// Lines to queue, in order
    pub queue: Vec<String>,
    /// Export directory the routine asked for, already created
    pub export_directory: Option<PathBuf>,
}

/// Loads routine files into queue lines
pub struct RoutineRunner;

impl RoutineRunner {
    /// Load `path`, fill placeholders and create its export directory.
    ///
    /// In test mode an `exit` is queued after the routine.
    pub fn prepare(path: &Path, substitution: &Substitution, test_mode: bool) -> Result<PreparedRoutine> {
        let script = RoutineScript::from_path(path)?;
        if script.is_empty() {
            return Err(Error::EmptyRoutine {
                path: path.to_path_buf(),
            });
        }

        if let Some(dir) = script.export_directory() {
            fs::create_dir_all(dir)?;
            info!("Routine exports go to {}", dir.display());
        }

        let rendered = script.render(substitution);
        let mut queue = vec![instruction(&rendered)];
        if test_mode && rendered.last().map(String::as_str) != Some("exit") {
            queue.push("exit".to_string());
        }

        debug!("Prepared routine {} as {:?}", path.display(), queue);
        Ok(PreparedRoutine {
            queue,
            export_directory: script.export_directory().map(Path::to_path_buf),
        })
    }
}
