//! Menu tree and navigation
//!
//! - [`path`] - menu addresses such as `/stocks/dd/`
//! - [`queue`] - pending input lines
//! - [`table`] - command name to handler tables
//! - [`node`] - menus and the [`Menu`] trait
//! - [`engine`] - the driver loop and universal commands

pub mod engine;
pub mod node;
pub mod path;
pub mod queue;
pub mod table;

pub use engine::{Engine, EngineState, EngineStatus, RootFactory};
pub use node::{Action, Menu, MenuNode};
pub use path::MenuPath;
pub use queue::CommandQueue;
pub use table::{CommandContext, CommandEntry, CommandKind, CommandTable, Handler};

/// Commands every menu accepts
pub const UNIVERSAL_COMMANDS: &[&str] = &[
    "help", "cls", "home", "quit", "exit", "reset", "record", "stop", "whoami", "results",
];

/// Queue entries that leave the current menu
pub fn is_quit_token(line: &str) -> bool {
    matches!(line.trim(), "quit" | "q" | "..")
}

/// Resolve the short aliases of universal commands
pub fn canonical_command(word: &str) -> &str {
    match word {
        ".." | "q" => "quit",
        "e" => "exit",
        "?" | "h" => "help",
        "r" => "reset",
        other => other,
    }
}
