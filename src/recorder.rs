//! Session recording
//!
//! `record` starts capturing the commands typed in the session, `stop`
//! saves them as a routine: a local `.openbb` file for guest sessions (or
//! with `--local`), otherwise an upload to the routine hub.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::Config;
use crate::console::{Console, LineSource};
use crate::error::{Error, Result};
use crate::hub::{RoutineHub, RoutineUpload, UploadStatus};
use crate::menu::MenuPath;

/// Extension of routine files
pub const ROUTINE_EXTENSION: &str = "openbb";

/// Fewest commands worth saving as a routine
pub const MIN_RECORDED_COMMANDS: usize = 4;

/// Tags a routine may carry
pub const TAG_VOCABULARY: &[&str] = &[
    "stocks",
    "crypto",
    "etf",
    "economy",
    "forex",
    "fixedincome",
    "alternative",
    "funds",
    "bonds",
    "macro",
    "equity",
    "options",
    "dashboards",
    "reports",
    "portfolio",
    "forecast",
    "technical",
    "fundamental",
    "earnings",
    "sentiment",
    "risk",
    "screener",
    "news",
];

const MAX_TAGS: usize = 3;

/// Arguments of `record`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingRequest {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub public: bool,
    pub local_only: bool,
}

/// A recording in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub public: bool,
    pub local_only: bool,
    /// Absolute path of the menu the recording started in, when not the root
    pub start_path: Option<String>,
    pub lines: Vec<String>,
}

impl RecordingSession {
    /// Lines of the saved routine: the start path followed by the commands
    pub fn script_lines(&self) -> impl Iterator<Item = &str> {
        self.start_path
            .as_deref()
            .into_iter()
            .chain(self.lines.iter().map(String::as_str))
    }
}

/// Where a stopped recording ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(PathBuf),
    Uploaded { url: Option<String> },
    /// The hub already had this name and the user kept it
    Declined,
}

/// Collaborators needed to save a recording
pub struct StopContext<'a> {
    pub console: &'a mut Console,
    pub prompt: &'a mut dyn LineSource,
    pub hub: Option<&'a dyn RoutineHub>,
    pub config: &'a Config,
}

/// Owner of the current recording, if any
#[derive(Debug, Clone, Default)]
pub struct SessionRecorder {
    session: Option<RecordingSession>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Recorded commands so far
    pub fn lines(&self) -> &[String] {
        self.session
            .as_ref()
            .map(|s| s.lines.as_slice())
            .unwrap_or_default()
    }

    /// Start recording in the menu at `path`.
    ///
    /// Returns false, after telling the user why, when the request is
    /// rejected.
    pub fn start(&mut self, request: RecordingRequest, path: &MenuPath, console: &mut Console) -> bool {
        if let Some(session) = &self.session {
            console.print(format!(
                "Already recording '{}'. Use 'stop' to save it first.",
                session.name
            ));
            return false;
        }

        let name = request.name.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            console.print("Set a routine title by using the '-n' flag. E.g. 'record -n Morning routine'");
            return false;
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c.is_whitespace()) {
            console.print("The routine title should only contain letters, numbers and spaces.");
            return false;
        }
        if request.tags.len() > MAX_TAGS {
            console.print(format!("A routine can have at most {} tags.", MAX_TAGS));
            return false;
        }
        if let Some(tag) = request
            .tags
            .iter()
            .find(|tag| !TAG_VOCABULARY.contains(&tag.as_str()))
        {
            console.print(format!(
                "Tag '{}' is not valid. Choose from: {}",
                tag,
                TAG_VOCABULARY.join(", ")
            ));
            return false;
        }

        console.print(format!(
            "Routine recording started: '{}'. Type 'stop' to save it.",
            name
        ));
        info!("Recording routine '{}' from {}", name, path);

        self.session = Some(RecordingSession {
            name,
            description: request.description.trim().to_string(),
            tags: request.tags,
            public: request.public,
            local_only: request.local_only,
            start_path: (!path.is_root()).then(|| path.to_command()),
            lines: Vec::new(),
        });
        true
    }

    /// Append `line` while recording
    pub fn record(&mut self, line: &str) {
        if let Some(session) = &mut self.session {
            session.lines.push(line.trim().to_string());
            debug!("Recorded '{}' ({} commands)", line.trim(), session.lines.len());
        }
    }

    /// Stop recording and save the routine.
    ///
    /// With too few commands the recording keeps running. Otherwise the
    /// recorder is empty afterwards whatever the outcome. Returns `Ok(None)`
    /// when nothing was saved.
    pub fn stop(&mut self, ctx: StopContext<'_>) -> Result<Option<SaveOutcome>> {
        let Some(recorded) = self.session.as_ref().map(|s| s.lines.len()) else {
            ctx.console
                .print("No routine is being recorded. Start one with 'record -n <title>'.");
            return Ok(None);
        };

        if recorded < MIN_RECORDED_COMMANDS {
            ctx.console.print(format!(
                "Record at least {} commands before saving a routine ({} so far). Still recording.",
                MIN_RECORDED_COMMANDS, recorded
            ));
            return Ok(None);
        }

        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        let remote = !session.local_only && !ctx.config.user.is_guest() && ctx.hub.is_some();
        let outcome = match (remote, ctx.hub) {
            (true, Some(hub)) => upload(&session, hub, ctx.console, ctx.prompt)?,
            _ => {
                let path = write_local(&session, ctx.config, ctx.prompt)?;
                ctx.console.print(format!("Routine saved to {}", path.display()));
                SaveOutcome::Written(path)
            }
        };

        info!("Recording '{}' finished: {:?}", session.name, outcome);
        Ok(Some(outcome))
    }
}

/// `My Routine` becomes `My_Routine`
pub fn routine_file_stem(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Routine file content with its header
pub fn render_routine(session: &RecordingSession, author: Option<&str>) -> String {
    let mut out = format!("# Title: {}\n", session.name);
    if let Some(author) = author {
        out.push_str(&format!("# Author: {}\n", author));
    }
    out.push_str(&format!("# Tags: {}\n", session.tags.join(", ")));
    out.push_str(&format!("# Description: {}\n\n", session.description));
    for line in session.script_lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn write_local(session: &RecordingSession, config: &Config, prompt: &mut dyn LineSource) -> Result<PathBuf> {
    let directory = config.routines_directory();
    fs::create_dir_all(&directory)?;

    let stem = routine_file_stem(&session.name);
    let mut path = directory.join(format!("{}.{}", stem, ROUTINE_EXTENSION));
    if path.exists() && !confirm_overwrite(&path, prompt)? {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        path = directory.join(format!("{}_{}.{}", stem, stamp, ROUTINE_EXTENSION));
    }

    fs::write(&path, render_routine(session, config.user.display_name()))?;
    debug!("Wrote routine {}", path.display());
    Ok(path)
}

fn confirm_overwrite(path: &Path, prompt: &mut dyn LineSource) -> Result<bool> {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    prompt.confirm(&format!("File '{}' already exists. Overwrite it?", name))
}

fn upload(
    session: &RecordingSession,
    hub: &dyn RoutineHub,
    console: &mut Console,
    prompt: &mut dyn LineSource,
) -> Result<SaveOutcome> {
    let mut request = RoutineUpload {
        name: session.name.clone(),
        description: session.description.clone(),
        tags: session.tags.clone(),
        script: session.script_lines().collect::<Vec<_>>().join("\n"),
        public: session.public,
        override_existing: false,
    };

    loop {
        match hub.upload(&request)? {
            UploadStatus::Created { url } => {
                console.print("Successfully uploaded your routine.");
                if let Some(url) = &url {
                    console.print(url);
                }
                return Ok(SaveOutcome::Uploaded { url });
            }
            UploadStatus::Conflict if !request.override_existing => {
                let question = format!(
                    "A routine named '{}' already exists. Do you want to replace it?",
                    session.name
                );
                if !prompt.confirm(&question)? {
                    console.print("Routine kept as it was on the hub.");
                    return Ok(SaveOutcome::Declined);
                }
                request.override_existing = true;
            }
            UploadStatus::Conflict => {
                return Err(Error::Hub(format!(
                    "the hub refused to replace '{}'",
                    session.name
                )))
            }
        }
    }
}
