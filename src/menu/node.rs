//! Menu nodes
//!
//! A [`MenuNode`] is one level of the command tree: a path, some state of
//! its own and a [`CommandTable`] over that state. The engine drives nodes
//! through the object-safe [`Menu`] trait so menus with different state
//! types can share one navigation stack.

use std::fmt;

use crate::completion::CompletionIndex;
use crate::console::Console;
use crate::error::Result;
use crate::parser::{CommandSchema, ParsedArgs};

use super::engine::EngineState;
use super::table::{CommandContext, CommandKind, CommandTable};
use super::MenuPath;

/// What the engine does after a command ran
pub enum Action {
    /// Stay on the current menu
    Stay,
    /// Push a submenu onto the navigation stack
    Enter(Box<dyn Menu>),
    /// Put lines at the front of the navigation queue
    Queue(Vec<String>),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Stay => f.write_str("Stay"),
            Action::Enter(menu) => f.debug_tuple("Enter").field(&menu.path().as_str()).finish(),
            Action::Queue(lines) => f.debug_tuple("Queue").field(lines).finish(),
        }
    }
}

/// Menu as seen by the engine
pub trait Menu {
    fn path(&self) -> &MenuPath;

    fn title(&self) -> &str;

    /// Names of the commands and submenus of this menu
    fn choices(&self) -> Vec<String>;

    fn has_command(&self, name: &str) -> bool;

    /// Extra patterns the tokenizer must not split inside
    fn split_filters(&self) -> &[String];

    fn print_help(&self, console: &mut Console);

    /// Parse `args` for `command` and run its handler.
    ///
    /// Parse failures and help requests have already been shown to the user
    /// and come back as [`Action::Stay`].
    fn execute(&mut self, command: &str, args: &[String], state: &mut EngineState) -> Result<Action>;

    /// Commands that restore this menu's state after the tree is rebuilt
    fn reset_commands(&self) -> Vec<String>;

    fn completion_index(&self) -> &CompletionIndex;
}

type ResetHook<S> = Box<dyn Fn(&S) -> Vec<String>>;

/// A menu over state `S`
pub struct MenuNode<S> {
    path: MenuPath,
    title: String,
    state: S,
    table: CommandTable<S>,
    reset_hook: Option<ResetHook<S>>,
    split_filters: Vec<String>,
    completion: CompletionIndex,
}

impl<S: 'static> MenuNode<S> {
    pub fn new(path: MenuPath, title: impl Into<String>, state: S) -> Self {
        Self {
            table: CommandTable::new(path.clone()),
            path,
            title: title.into(),
            state,
            reset_hook: None,
            split_filters: Vec::new(),
            completion: CompletionIndex::new(),
        }
    }

    /// Add a command
    pub fn command<F>(self, schema: CommandSchema, handler: F) -> Result<Self>
    where
        F: Fn(&mut S, &mut CommandContext<'_>, &ParsedArgs) -> Result<Action> + 'static,
    {
        self.register(CommandKind::Command, schema, handler)
    }

    /// Add a command entering a submenu; the handler returns [`Action::Enter`]
    pub fn submenu<F>(self, schema: CommandSchema, handler: F) -> Result<Self>
    where
        F: Fn(&mut S, &mut CommandContext<'_>, &ParsedArgs) -> Result<Action> + 'static,
    {
        self.register(CommandKind::Submenu, schema, handler)
    }

    fn register<F>(mut self, kind: CommandKind, schema: CommandSchema, handler: F) -> Result<Self>
    where
        F: Fn(&mut S, &mut CommandContext<'_>, &ParsedArgs) -> Result<Action> + 'static,
    {
        let name = schema.name().to_string();
        let flags = schema.completion();
        self.table.register(kind, schema, handler)?;
        *self.completion.insert(name) = flags;
        Ok(self)
    }

    /// Commands queued after re-entering this menu on `reset`
    pub fn on_reset(mut self, hook: impl Fn(&S) -> Vec<String> + 'static) -> Self {
        self.reset_hook = Some(Box::new(hook));
        self
    }

    /// Keep matches of `pattern` in one piece when splitting input on `/`
    pub fn protect(mut self, pattern: impl Into<String>) -> Self {
        self.split_filters.push(pattern.into());
        self
    }

    /// Replace the completion values offered after `flag` of `command`
    pub fn set_flag_choices<I, V>(&mut self, command: &str, flag: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        match self.completion.get_mut(command) {
            Some(flags) => flags.set_values(flag, values),
            None => warn!("No command '{}' on {} to complete {}", command, self.path, flag),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S: 'static> Menu for MenuNode<S> {
    fn path(&self) -> &MenuPath {
        &self.path
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn choices(&self) -> Vec<String> {
        self.table.names().map(str::to_string).collect()
    }

    fn has_command(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    fn split_filters(&self) -> &[String] {
        &self.split_filters
    }

    fn print_help(&self, console: &mut Console) {
        console.newline();
        console.print(format!("{} ({})", self.title, self.path));
        console.newline();
        for entry in self.table.entries() {
            let marker = match entry.kind {
                CommandKind::Command => ' ',
                CommandKind::Submenu => '>',
            };
            console.print(format!("{}   {:<14}{}", marker, entry.name(), entry.schema.about()));
        }
    }

    fn execute(&mut self, command: &str, args: &[String], state: &mut EngineState) -> Result<Action> {
        let Some(entry) = self.table.get(command) else {
            state.console.print("Command not recognized!");
            return Ok(Action::Stay);
        };

        let parsed = match entry.schema.parse(args, &mut state.console, &state.config.preferences) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("{}{}: {}", self.path, command, e);
                return Ok(Action::Stay);
            }
        };

        let mut ctx = CommandContext {
            path: &self.path,
            state,
        };
        entry.call(&mut self.state, &mut ctx, &parsed)
    }

    fn reset_commands(&self) -> Vec<String> {
        self.reset_hook
            .as_ref()
            .map(|hook| hook(&self.state))
            .unwrap_or_default()
    }

    fn completion_index(&self) -> &CompletionIndex {
        &self.completion
    }
}
