//! Configuration management for menuterm
//!
//! User preferences (export directory and feature flags), the routine hub
//! endpoints and the signed-in user. Everything here is plain data; loading
//! and saving live in [`loader`].

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default production routine hub
pub const DEFAULT_HUB_URL: &str = "https://hub.menuterm.dev/api";

/// Default development routine hub, selected with `--dev`
pub const DEFAULT_HUB_DEV_URL: &str = "https://dev.hub.menuterm.dev/api";

/// Main configuration structure for menuterm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User preferences and feature flags
    pub preferences: Preferences,

    /// Routine hub endpoints
    pub hub: HubConfig,

    /// Signed-in user, empty for guest sessions
    pub user: UserConfig,
}

impl Config {
    /// Point the hub client at the development backend
    pub fn use_dev_backend(&mut self) {
        info!("Switching routine hub to {}", self.hub.dev_url);
        self.hub.base_url = self.hub.dev_url.clone();
    }

    /// Directory where recorded routines are written and looked up
    pub fn routines_directory(&self) -> PathBuf {
        self.preferences.export_directory.join("routines")
    }
}

/// User preferences consumed by the menu engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Root for exported files and recorded routines
    pub export_directory: PathBuf,

    /// Use the line editor (history and tab completion) for prompting
    pub use_line_editor: bool,

    /// Show the parent menu after quitting a submenu with nothing queued
    pub enable_exit_auto_help: bool,

    /// Clear the screen before each command is parsed
    pub use_clear_after_cmd: bool,

    /// Batch mode: never prompt, exit once the queue drains
    pub test_mode: bool,

    /// Persist the interactive prompt history here
    pub history_file: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        let export_directory = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("MenuTermUserData")
            .join("exports");

        Self {
            export_directory,
            use_line_editor: true,
            enable_exit_auto_help: true,
            use_clear_after_cmd: false,
            test_mode: false,
            history_file: dirs::home_dir().map(|home| home.join(".menuterm_history")),
        }
    }
}

/// Routine hub endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Active base URL
    pub base_url: String,

    /// Development base URL
    pub dev_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HUB_URL.to_string(),
            dev_url: DEFAULT_HUB_DEV_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

/// Signed-in user details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Hub access token; absent for guest sessions
    pub token: Option<String>,
}

impl UserConfig {
    /// Guest sessions have no hub token and always record locally
    pub fn is_guest(&self) -> bool {
        self.token.as_deref().map(str::trim).unwrap_or_default().is_empty()
    }

    /// Name used in routine headers and `whoami`
    pub fn display_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}
