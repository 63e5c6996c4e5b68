//! MenuTerm - interactive command menus for financial data
//!
//! Starts the menu engine on the demonstration menu tree, optionally running
//! routine scripts or queued commands first.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use menuterm::recorder::ROUTINE_EXTENSION;
use menuterm::routine::{parse_routine_args, RoutineRunner, Substitution};
use menuterm::{
    build_engine, handle_startup_error, Config, Console, EditorPrompt, Error, LineSource,
    StdinPrompt,
};

#[derive(Parser)]
#[command(name = "menuterm")]
#[command(about = "Interactive command menus with routine recording and playback", long_about = None)]
#[command(version)]
struct Cli {
    /// Routine files to run, or command lines such as "stocks/load AAPL"
    #[arg(long, num_args = 1..)]
    file: Vec<String>,

    /// Routine arguments, comma separated; [a,b] is one argument
    #[arg(short, long)]
    input: Option<String>,

    /// Batch mode: run the routines, then exit
    #[arg(short, long)]
    test: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Use the development routine hub
    #[arg(long)]
    dev: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting {} v{}", menuterm::NAME, menuterm::VERSION);

    let mut config =
        menuterm::init(cli.config.as_deref()).map_err(|e| anyhow!(handle_startup_error(&e)))?;
    if cli.dev {
        config.use_dev_backend();
    }
    if cli.test {
        config.preferences.test_mode = true;
    }

    let mut console = Console::stdout();
    let queue = initial_queue(&cli, &mut config, &mut console)?;

    let prompt = make_prompt(&config);
    let mut engine = build_engine(config, console, prompt)
        .map_err(|e| anyhow!("Failed to start the menu engine: {}", e))?;
    engine.queue_lines(queue);
    engine.run();
    Ok(())
}

/// Lines to run before the first prompt
fn initial_queue(cli: &Cli, config: &mut Config, console: &mut Console) -> Result<Vec<String>> {
    let substitution = Substitution::from_args(
        cli.input
            .as_deref()
            .map(parse_routine_args)
            .unwrap_or_default(),
    );

    let mut queue = Vec::new();
    for item in &cli.file {
        if !is_routine(item) {
            queue.push(item.clone());
            continue;
        }

        match RoutineRunner::prepare(Path::new(item), &substitution, false) {
            Ok(prepared) => {
                if let Some(dir) = prepared.export_directory {
                    config.preferences.export_directory = dir;
                }
                queue.extend(prepared.queue);
            }
            Err(e @ (Error::RoutineNotFound { .. } | Error::EmptyRoutine { .. })) => {
                console.print(&e);
                if config.preferences.test_mode {
                    return Err(anyhow!(handle_startup_error(&e)));
                }
                warn!("Skipping routine {}: {}", item, e);
            }
            Err(e) => return Err(anyhow!(handle_startup_error(&e))),
        }
    }

    if config.preferences.test_mode && queue.last().map(String::as_str) != Some("exit") {
        queue.push("exit".to_string());
    }
    debug!("Initial queue: {:?}", queue);
    Ok(queue)
}

fn is_routine(item: &str) -> bool {
    let path = Path::new(item);
    path.is_file() || path.extension().is_some_and(|ext| ext == ROUTINE_EXTENSION)
}

fn make_prompt(config: &Config) -> Box<dyn LineSource> {
    let preferences = &config.preferences;
    if !preferences.use_line_editor || preferences.test_mode {
        return Box::new(StdinPrompt::new());
    }

    match EditorPrompt::new(preferences.history_file.clone()) {
        Ok(prompt) => Box::new(prompt),
        Err(e) => {
            warn!("Line editor unavailable, using plain input: {}", e);
            Box::new(StdinPrompt::new())
        }
    }
}
