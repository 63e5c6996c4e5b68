//! MenuTerm - an interactive command-menu engine for financial data terminals
//!
//! This library provides the menu engine behind the `menuterm` binary: a
//! path-addressed tree of menus driven by one navigation queue, with session
//! recording and replayable routine scripts.
//!
//! ## Features
//!
//! - **Menu Tree:** Menus addressed by path (`/stocks/dd/`), entered and left through a navigation stack
//! - **Chained Input:** `stocks/load AAPL/dd` runs three commands in order
//! - **Argument Parsing:** `clap` schemas per command with shared `--export`, `--raw` and `--limit` flags
//! - **Error Recovery:** Unknown commands are replaced by the closest known one
//! - **Recording:** `record` / `stop` save the session as a routine file or upload it
//! - **Routines:** Script files with `$ARGV[n]` and `${key=default}` placeholders
//! - **Configuration:** TOML or JSON preferences
//!
//! ## Module Organization
//!
//! ### Core Functionality
//!
//! - [`menu`] - Menu paths, command tables, menu nodes and the engine loop
//! - [`tokenizer`] - Splitting input lines on `/`
//! - [`parser`] - Command schemas on top of `clap`
//! - [`recorder`] - Session recording
//! - [`routine`] - Routine script loading and placeholder substitution
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Supporting Modules
//!
//! - [`config`] - Configuration loading and preferences
//! - [`console`] - Output sink and interactive prompts
//! - [`completion`] - Tab completion and "did you mean" matching
//! - [`hub`] - Routine hub client
//! - [`results`] - Stored command results
//! - [`export`] - `--export` file writing
//! - [`menus`] - The demonstration menu tree
//!
//! ## Quick Start
//!
//! ```no_run
//! use menuterm::{build_engine, init, Console, StdinPrompt};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = init(None)?;
//! let mut engine = build_engine(config, Console::stdout(), Box::new(StdinPrompt::new()))?;
//! engine.run();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Everything runs on one thread. The [`menu::Engine`] owns the navigation
//! stack and an [`menu::EngineState`] that every command handler receives
//! mutably; there are no globals and no locks. Routine uploads block on a
//! current-thread `tokio` runtime owned by the hub client.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod completion;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod hub;
pub mod parser;
pub mod recorder;
pub mod results;
pub mod routine;
pub mod tokenizer;

// Core modules
pub mod menu;
pub use menu::{Action, Engine, EngineState, Menu, MenuNode, MenuPath};

// Menu tree
pub mod menus;

// Re-exports for core functionality
pub use config::Config;
pub use console::{Console, EditorPrompt, LineSource, ScriptedPrompt, StdinPrompt};
pub use error::{DispatchError, Error, Result};

// Convenience re-exports for common types
pub use config::loader::ConfigLoader;
pub use hub::{HubClient, RoutineHub};
pub use parser::{CommandSchema, ParsedArgs};
pub use tokenizer::split_input;

use std::path::Path;

// Version information
/// The current version of MenuTerm from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Load the configuration.
///
/// With `config_path` the file must exist and parse. Without it the default
/// search paths are tried and defaults are used when nothing loads.
///
/// # Errors
///
/// Returns an error if an explicit configuration file is missing or invalid.
pub fn init(config_path: Option<&Path>) -> Result<Config> {
    info!("Initializing {} v{}", NAME, VERSION);

    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::ConfigLoadFailed {
                    path: path.to_path_buf(),
                    reason: "Configuration file does not exist".to_string(),
                });
            }
            let config = ConfigLoader::load_from_path(path)?;
            info!("Configuration loaded from {}", path.display());
            config
        }
        None => match ConfigLoader::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load configuration: {}. Using defaults", e);
                Config::default()
            }
        },
    };

    Ok(config)
}

/// Engine over the demonstration menu tree.
///
/// Signed-in users get a routine hub client; guests record locally.
pub fn build_engine(config: Config, console: Console, prompt: Box<dyn LineSource>) -> Result<Engine> {
    let hub = match config.user.token.as_deref() {
        Some(token) if !config.user.is_guest() => match HubClient::new(&config.hub, token) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Routine hub unavailable, recordings stay local: {}", e);
                None
            }
        },
        _ => None,
    };

    let mut state = EngineState::new(config, console, prompt);
    if let Some(hub) = hub {
        state = state.with_hub(Box::new(hub));
    }

    Engine::new(state, menus::root_menu)
}

/// User-facing explanation of a startup failure
pub fn handle_startup_error(error: &Error) -> String {
    match error {
        Error::ConfigLoadFailed { path, reason } => {
            format!(
                "Configuration Error: Failed to load config from '{}': {}\n\nTry:\n• Check configuration file syntax\n• Ensure file permissions are correct",
                path.display(),
                reason
            )
        }
        Error::ConfigParseFailed { format, reason } => {
            format!(
                "Configuration Error: Failed to parse {} config: {}\n\nTry:\n• Ensure the file is valid {}",
                format, reason, format
            )
        }
        Error::ConfigValidationFailed { field, reason } => {
            format!(
                "Configuration Error: Validation failed for '{}': {}\n\nTry:\n• Check the configuration value",
                field, reason
            )
        }
        Error::RoutineNotFound { path } => {
            format!(
                "Routine Error: '{}' does not exist\n\nTry:\n• Check the path\n• Routines are looked up in <export_directory>/routines",
                path.display()
            )
        }
        Error::Io(err) => {
            format!(
                "I/O Error: {}\n\nTry:\n• Check file permissions\n• Ensure required directories exist",
                err
            )
        }
        _ => {
            format!(
                "Unexpected Error: {}\n\nPlease report this issue with debug logs enabled",
                error
            )
        }
    }
}
