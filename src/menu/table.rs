//! Command tables: command name to schema and handler

use crate::error::{Error, Result};
use crate::parser::{CommandSchema, ParsedArgs};

use super::engine::EngineState;
use super::node::Action;
use super::{MenuPath, UNIVERSAL_COMMANDS};

/// What a handler can reach besides its own menu state
pub struct CommandContext<'a> {
    /// Path of the menu running the command
    pub path: &'a MenuPath,
    pub state: &'a mut EngineState,
}

/// Command handler over menu state `S`
pub type Handler<S> = Box<dyn Fn(&mut S, &mut CommandContext<'_>, &ParsedArgs) -> Result<Action>>;

/// Plain command or entry into a submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Command,
    Submenu,
}

pub struct CommandEntry<S> {
    pub kind: CommandKind,
    pub schema: CommandSchema,
    handler: Handler<S>,
}

impl<S> CommandEntry<S> {
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn call(&self, state: &mut S, ctx: &mut CommandContext<'_>, args: &ParsedArgs) -> Result<Action> {
        (self.handler)(state, ctx, args)
    }
}

/// Commands of one menu, in registration order
pub struct CommandTable<S> {
    path: MenuPath,
    entries: Vec<CommandEntry<S>>,
}

impl<S> CommandTable<S> {
    pub fn new(path: MenuPath) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// Register a command.
    ///
    /// Names must be unique on the menu and must not shadow a universal
    /// command.
    pub fn register<F>(&mut self, kind: CommandKind, schema: CommandSchema, handler: F) -> Result<()>
    where
        F: Fn(&mut S, &mut CommandContext<'_>, &ParsedArgs) -> Result<Action> + 'static,
    {
        let name = schema.name().to_string();
        if self.contains(&name) || UNIVERSAL_COMMANDS.contains(&name.as_str()) {
            return Err(Error::DuplicateCommand {
                path: self.path.to_string(),
                command: name,
            });
        }

        self.entries.push(CommandEntry {
            kind,
            schema,
            handler: Box::new(handler),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry<S>> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(CommandEntry::name)
    }

    pub fn entries(&self) -> &[CommandEntry<S>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
