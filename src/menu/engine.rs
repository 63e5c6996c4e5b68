//! Menu engine
//!
//! The engine owns the navigation stack of menus and the [`EngineState`]
//! shared by every menu. Each [`Engine::step`] consumes one line, taken from
//! the navigation queue or, when the queue is empty, from the prompt.
//!
//! Leaving menus is expressed through the queue: `quit` queues one `quit`
//! token, `home` one per level above the root and `exit` one per level. The
//! engine pops one menu for every `quit` token at the head of the queue, so
//! commands queued behind them keep running in the parent menu.

use std::collections::BTreeMap;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction};

use crate::completion::{closest_match, CompletionIndex, SUGGESTION_CUTOFF};
use crate::config::Config;
use crate::console::{Console, LineSource};
use crate::error::{DispatchError, Result};
use crate::hub::RoutineHub;
use crate::parser::{CommandSchema, ParsedArgs};
use crate::recorder::{RecordingRequest, SessionRecorder, StopContext, TAG_VOCABULARY};
use crate::results::ResultRegistry;
use crate::tokenizer::{split_input, split_words};

use super::node::{Action, Menu};
use super::queue::CommandQueue;
use super::{canonical_command, is_quit_token, MenuPath, UNIVERSAL_COMMANDS};

/// Everything commands share across menus
pub struct EngineState {
    pub config: Config,
    pub console: Console,
    pub queue: CommandQueue,
    pub recorder: SessionRecorder,
    pub results: ResultRegistry,
    pub prompt: Box<dyn LineSource>,
    /// Routine hub, present for signed-in users
    pub hub: Option<Box<dyn RoutineHub>>,
}

impl EngineState {
    pub fn new(config: Config, console: Console, prompt: Box<dyn LineSource>) -> Self {
        Self {
            config,
            console,
            queue: CommandQueue::new(),
            recorder: SessionRecorder::new(),
            results: ResultRegistry::new(),
            prompt,
            hub: None,
        }
    }

    pub fn with_hub(mut self, hub: Box<dyn RoutineHub>) -> Self {
        self.hub = Some(hub);
        self
    }
}

/// Builds the root menu, again on every `reset`
pub type RootFactory = Box<dyn Fn(&Config) -> Result<Box<dyn Menu>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    AwaitingInput,
    Dispatching,
    Exited,
}

pub struct Engine {
    state: EngineState,
    stack: Vec<Box<dyn Menu>>,
    root: RootFactory,
    universal: BTreeMap<&'static str, CommandSchema>,
    status: EngineStatus,
    /// Lines at the head of the queue queued by `reset`, kept out of recordings
    replay_pending: usize,
    replaying: bool,
}

impl Engine {
    pub fn new<F>(state: EngineState, root: F) -> Result<Self>
    where
        F: Fn(&Config) -> Result<Box<dyn Menu>> + 'static,
    {
        let menu = root(&state.config)?;
        Ok(Self {
            state,
            stack: vec![menu],
            root: Box::new(root),
            universal: universal_schemas(),
            status: EngineStatus::AwaitingInput,
            replay_pending: 0,
            replaying: false,
        })
    }

    /// Append lines to the navigation queue
    pub fn queue_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.queue.extend(lines);
    }

    /// Run until the last menu is left
    pub fn run(&mut self) {
        info!("Menu engine started at {}", self.path_label());
        while self.step() {}
        info!("Menu engine exited");
    }

    /// Process one line. Returns false once the engine has exited.
    pub fn step(&mut self) -> bool {
        if self.status == EngineStatus::Exited || self.stack.is_empty() {
            self.status = EngineStatus::Exited;
            return false;
        }

        if self.state.queue.front().is_some_and(is_quit_token) {
            if let Some(token) = self.state.queue.pop_front() {
                self.state.recorder.record(&token);
            }
            self.leave_menu();
            if self.stack.is_empty() {
                self.status = EngineStatus::Exited;
                return false;
            }
            if self.state.queue.is_empty() && self.state.config.preferences.enable_exit_auto_help {
                self.state.queue.push_front("help");
            }
            return true;
        }

        self.replaying = false;
        let line = match self.state.queue.pop_front() {
            Some(line) => {
                if self.replay_pending > 0 {
                    self.replay_pending -= 1;
                    self.replaying = true;
                }
                let first = line.split_whitespace().next().unwrap_or_default();
                if self.is_choice(first) {
                    let echo = format!("{} $ {}", self.path_label(), line);
                    self.state.console.print(echo);
                }
                line
            }
            None => self.read_line(),
        };

        self.status = EngineStatus::Dispatching;
        if let Err(DispatchError::NotFound { command }) = self.switch(&line) {
            self.recover(&line, &command);
        }
        self.replaying = false;
        if self.status == EngineStatus::Dispatching {
            self.status = EngineStatus::AwaitingInput;
        }
        true
    }

    /// Dispatch one input line.
    ///
    /// Several `/`-separated commands are queued in order and nothing runs
    /// this turn. A single command runs on the current menu.
    pub fn switch(&mut self, line: &str) -> std::result::Result<(), DispatchError> {
        let filters = self
            .stack
            .last()
            .map(|menu| menu.split_filters().to_vec())
            .unwrap_or_default();
        let mut segments: Vec<String> = split_input(line, &filters)
            .into_iter()
            .map(|segment| segment.trim().to_string())
            .collect();

        if segments.len() > 1 {
            if segments[0].is_empty() {
                segments[0] = "home".to_string();
            }
            self.state
                .queue
                .push_front_all(segments.into_iter().filter(|segment| !segment.is_empty()));
            return Ok(());
        }

        let Some(segment) = segments.pop() else {
            return Ok(());
        };
        let words = split_words(&segment);
        let Some((first, args)) = words.split_first() else {
            return Ok(());
        };

        let command = canonical_command(first);
        let universal = self.universal.contains_key(command);
        let on_menu = self.stack.last().is_some_and(|menu| menu.has_command(command));
        if !universal && !on_menu {
            return Err(DispatchError::NotFound {
                command: first.clone(),
            });
        }

        // Leaving menus is recorded through the quit tokens it queues
        let recorded = !matches!(
            command,
            "record" | "stop" | "reset" | "quit" | "home" | "exit"
        );
        if recorded && !self.replaying && self.state.recorder.is_active() {
            self.state.recorder.record(&segment);
        }

        let outcome = if universal {
            self.run_universal(command, args)
        } else {
            self.run_menu_command(command, args)
        };

        if let Err(e) = outcome {
            error!("'{}' failed on {}: {}", segment, self.path_label(), e);
            self.state.console.print(format!("Error: {}", e));
        }
        Ok(())
    }

    pub fn current_path(&self) -> Option<&MenuPath> {
        self.stack.last().map(|menu| menu.path())
    }

    /// Number of menus on the stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    /// Universal commands, their aliases and the current menu's commands
    pub fn choices(&self) -> Vec<String> {
        let mut choices: Vec<String> = UNIVERSAL_COMMANDS.iter().map(|c| c.to_string()).collect();
        choices.extend(["?", "h", "q", "..", "e", "r"].map(String::from));
        if let Some(menu) = self.stack.last() {
            choices.extend(menu.choices());
        }
        choices
    }

    fn is_choice(&self, word: &str) -> bool {
        self.universal.contains_key(canonical_command(word))
            || self.stack.last().is_some_and(|menu| menu.has_command(word))
    }

    fn path_label(&self) -> String {
        self.current_path()
            .map(MenuPath::to_string)
            .unwrap_or_else(|| "/".to_string())
    }

    fn read_line(&mut self) -> String {
        if self.state.config.preferences.test_mode {
            return "exit".to_string();
        }

        self.status = EngineStatus::AwaitingInput;
        let mut index = CompletionIndex::new();
        for (name, schema) in &self.universal {
            *index.insert(*name) = schema.completion();
        }
        if let Some(menu) = self.stack.last() {
            index.merge(menu.completion_index());
        }

        let prompt = format!("{} $ ", self.path_label());
        match self.state.prompt.read_line(&prompt, &index) {
            Ok(Some(line)) => line,
            Ok(None) => "exit".to_string(),
            Err(e) => {
                warn!("Reading input failed, leaving: {}", e);
                "exit".to_string()
            }
        }
    }

    fn recover(&mut self, line: &str, command: &str) {
        let line = line.trim();
        self.state.console.print(format!(
            "The command '{}' doesn't exist on the {} menu.",
            line,
            self.path_label()
        ));

        let choices = self.choices();
        let Some(best) = closest_match(command, choices.iter().map(String::as_str), SUGGESTION_CUTOFF)
        else {
            debug!("No replacement for '{}'", command);
            return;
        };

        let corrected = match line.split_once(char::is_whitespace) {
            Some((_, rest)) => format!("{} {}", best, rest.trim_start()),
            None => best.to_string(),
        };
        self.state.console.print(format!("Replacing by '{}'.", corrected));
        self.state.queue.push_front(corrected);
    }

    fn leave_menu(&mut self) {
        if let Some(menu) = self.stack.pop() {
            debug!("Left {}", menu.path());
        }
    }

    fn run_menu_command(&mut self, command: &str, args: &[String]) -> Result<()> {
        let action = match self.stack.last_mut() {
            Some(menu) => menu.execute(command, args, &mut self.state)?,
            None => return Ok(()),
        };

        match action {
            Action::Stay => {}
            Action::Enter(menu) => {
                debug!("Entering {}", menu.path());
                self.stack.push(menu);
            }
            Action::Queue(lines) => self.state.queue.push_front_all(lines),
        }
        Ok(())
    }

    fn run_universal(&mut self, command: &str, args: &[String]) -> Result<()> {
        let Some(schema) = self.universal.get(command) else {
            return Ok(());
        };
        let parsed = match schema.parse(args, &mut self.state.console, &self.state.config.preferences) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("{}: {}", command, e);
                return Ok(());
            }
        };
        debug!("Universal command '{}' on {}", command, self.path_label());

        match command {
            "help" => self.print_help(),
            "cls" => self.state.console.clear_screen(),
            "quit" => self.state.queue.push_front("quit"),
            "home" => self.queue_quits(self.stack.len().saturating_sub(1)),
            "exit" => self.queue_quits(self.stack.len()),
            "reset" => self.reset()?,
            "record" => self.start_recording(&parsed),
            "stop" => {
                self.state.recorder.stop(StopContext {
                    console: &mut self.state.console,
                    prompt: self.state.prompt.as_mut(),
                    hub: self.state.hub.as_deref(),
                    config: &self.state.config,
                })?;
            }
            "whoami" => self.whoami(),
            "results" => self.show_results(&parsed)?,
            other => debug!("Universal command '{}' has no action", other),
        }
        Ok(())
    }

    fn queue_quits(&mut self, count: usize) {
        self.state.queue.push_front_all(std::iter::repeat("quit").take(count));
    }

    fn print_help(&mut self) {
        if let Some(menu) = self.stack.last() {
            menu.print_help(&mut self.state.console);
        }
        let console = &mut self.state.console;
        console.newline();
        console.print("    help (?, h)      show this menu");
        console.print("    cls              clear the screen");
        console.print("    home             go to the root menu");
        console.print("    quit (q, ..)     go back one menu");
        console.print("    exit (e)         leave the terminal");
        console.print("    reset (r)        reload the menus and come back here");
        console.print("    record / stop    record the session as a routine");
        console.print("    whoami           show the signed-in user");
        console.print("    results          list stored command results");
        console.newline();
    }

    /// Rebuild the menu tree and replay the way back to the current menu.
    ///
    /// Configuration, the recorder and the prompt survive; stored results
    /// are cleared.
    fn reset(&mut self) -> Result<()> {
        let mut replay: Vec<String> = Vec::new();
        for menu in self.stack.iter().skip(1) {
            replay.push(menu.path().name().to_string());
            replay.extend(menu.reset_commands());
        }

        let root = (self.root)(&self.state.config)?;
        self.stack.clear();
        self.stack.push(root);
        self.state.results.clear();
        self.replay_pending = replay.len();
        self.state.queue.push_front_all(replay);
        info!("Menu tree reset");
        Ok(())
    }

    fn start_recording(&mut self, parsed: &ParsedArgs) {
        let tags = ["tag1", "tag2", "tag3"]
            .iter()
            .filter_map(|id| parsed.get_string(id))
            .collect();
        let request = RecordingRequest {
            name: parsed.get_joined("name").unwrap_or_default(),
            description: parsed.get_joined("description").unwrap_or_default(),
            tags,
            public: parsed.get_flag("public"),
            local_only: parsed.get_flag("local"),
        };

        let path = self.current_path().cloned().unwrap_or_else(MenuPath::root);
        self.state.recorder.start(request, &path, &mut self.state.console);
    }

    fn whoami(&mut self) {
        let user = &self.state.config.user;
        if user.is_guest() {
            self.state
                .console
                .print("You are currently logged in as a guest. Recordings are saved locally.");
        } else {
            let name = user.display_name().unwrap_or("unknown user").to_string();
            self.state.console.print(format!("Signed in as {}", name));
        }
        if let Some(email) = self.state.config.user.email.clone() {
            self.state.console.print(format!("Email: {}", email));
        }
        let routines = self.state.config.routines_directory();
        self.state
            .console
            .print(format!("Routines folder: {}", routines.display()));
    }

    fn show_results(&mut self, parsed: &ParsedArgs) -> Result<()> {
        if let Some(selector) = parsed.get_string("key") {
            match self.state.results.lookup(&selector) {
                Some(entry) => {
                    let text = serde_json::to_string_pretty(&entry.value)?;
                    self.state.console.print(text);
                }
                None => self
                    .state
                    .console
                    .print(format!("No result stored under '{}'.", selector)),
            }
            return Ok(());
        }

        if self.state.results.is_empty() {
            self.state.console.print("No results stored yet.");
            return Ok(());
        }

        let limit = parsed.limit.unwrap_or(usize::MAX);
        let lines: Vec<String> = self
            .state
            .results
            .entries()
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(i, entry)| {
                format!(
                    "{:>3}  {:<10} {:<24} {}",
                    i,
                    entry.key.as_deref().unwrap_or("-"),
                    entry.origin,
                    entry.created_at.format("%H:%M:%S")
                )
            })
            .collect();
        for line in lines {
            self.state.console.print(line);
        }
        Ok(())
    }
}

fn universal_schemas() -> BTreeMap<&'static str, CommandSchema> {
    let record = CommandSchema::new("record", "Start recording the session as a routine")
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .num_args(1..)
                .help("Routine title"),
        )
        .arg(
            Arg::new("description")
                .short('d')
                .long("description")
                .num_args(1..)
                .help("What the routine does"),
        )
        .arg(tag_arg("tag1"))
        .arg(tag_arg("tag2"))
        .arg(tag_arg("tag3"))
        .arg(
            Arg::new("public")
                .long("public")
                .action(ArgAction::SetTrue)
                .help("Make the uploaded routine public"),
        )
        .arg(
            Arg::new("local")
                .long("local")
                .action(ArgAction::SetTrue)
                .help("Save the routine locally even when signed in"),
        );

    let results = CommandSchema::new("results", "List stored command results")
        .arg(Arg::new("key").help("Index or key of the result to show"))
        .with_limit(10);

    let simple = [
        ("help", "Show the commands of this menu"),
        ("cls", "Clear the screen"),
        ("home", "Go to the root menu"),
        ("quit", "Go back one menu"),
        ("exit", "Leave the terminal"),
        ("reset", "Reload the menus and return here"),
        ("stop", "Stop recording and save the routine"),
        ("whoami", "Show the signed-in user"),
    ];

    let mut schemas: BTreeMap<&'static str, CommandSchema> = simple
        .into_iter()
        .map(|(name, about)| (name, CommandSchema::new(name, about)))
        .collect();
    schemas.insert("record", record);
    schemas.insert("results", results);
    schemas
}

fn tag_arg(id: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name("TAG")
        .value_parser(PossibleValuesParser::new(TAG_VOCABULARY.iter().copied()))
        .help("Routine tag")
}
