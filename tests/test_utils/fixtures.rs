//! Test Fixtures

use std::path::Path;

use menuterm::console::OutputBuffer;
use menuterm::menu::{Engine, EngineState};
use menuterm::menus::root_menu;
use menuterm::{Config, Console, RoutineHub, ScriptedPrompt};
use tempfile::TempDir;

/// Batch-mode configuration exporting under `dir`
pub fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.preferences.export_directory = dir.join("exports");
    config.preferences.test_mode = true;
    config.preferences.use_line_editor = false;
    config.preferences.enable_exit_auto_help = false;
    config.preferences.history_file = None;
    config
}

/// Engine with captured output in its own temporary directory
pub struct TestSession {
    pub engine: Engine,
    pub output: OutputBuffer,
    pub dir: TempDir,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with(|_| {}, ScriptedPrompt::default(), None)
    }

    /// Session with a tweaked configuration, scripted answers and an optional hub
    pub fn with(
        configure: impl FnOnce(&mut Config),
        prompt: ScriptedPrompt,
        hub: Option<Box<dyn RoutineHub>>,
    ) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut config = create_test_config(dir.path());
        configure(&mut config);

        let (console, output) = Console::buffered();
        let mut state = EngineState::new(config, console, Box::new(prompt));
        if let Some(hub) = hub {
            state = state.with_hub(hub);
        }
        let engine = Engine::new(state, root_menu).expect("engine");

        Self {
            engine,
            output,
            dir,
        }
    }

    /// Queue `lines` and run until the queue is empty
    pub fn run(&mut self, lines: &[&str]) {
        self.engine.queue_lines(lines.iter().copied());
        drain(&mut self.engine);
    }

    pub fn path(&self) -> String {
        self.engine
            .current_path()
            .map(|path| path.to_string())
            .unwrap_or_default()
    }

    pub fn routines_dir(&self) -> std::path::PathBuf {
        self.engine.state().config.routines_directory()
    }
}

/// Engine over the demonstration menus with default test settings
pub fn create_test_engine(dir: &Path) -> (Engine, OutputBuffer) {
    let (console, output) = Console::buffered();
    let state = EngineState::new(
        create_test_config(dir),
        console,
        Box::new(ScriptedPrompt::default()),
    );
    (Engine::new(state, root_menu).expect("engine"), output)
}

/// Step until nothing is queued
pub fn drain(engine: &mut Engine) {
    while !engine.state().queue.is_empty() {
        if !engine.step() {
            break;
        }
    }
}

pub fn queue_of(engine: &Engine) -> Vec<String> {
    engine.state().queue.iter().map(str::to_string).collect()
}
