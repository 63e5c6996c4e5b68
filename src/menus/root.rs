use std::fs;
use std::path::{Path, PathBuf};

use clap::Arg;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::menu::{Action, CommandContext, Menu, MenuNode, MenuPath};
use crate::parser::{CommandSchema, ParsedArgs};
use crate::recorder::ROUTINE_EXTENSION;
use crate::routine::{parse_routine_args, RoutineRunner, Substitution};

use super::stocks;

/// Root menu `/`
pub fn root_menu(config: &Config) -> Result<Box<dyn Menu>> {
    let exe = CommandSchema::new("exe", "Run a routine script")
        .arg(
            Arg::new("file")
                .long("file")
                .num_args(1..)
                .required(true)
                .help("Routine file, relative to the routines folder"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Routine arguments, comma separated; [a,b] is one argument"),
        )
        .with_default_flag("--file");

    let mut node = MenuNode::new(MenuPath::root(), "Home", ())
        .submenu(CommandSchema::new("stocks", "Stocks"), |_, ctx, _| {
            Ok(Action::Enter(stocks::stocks_menu(ctx.path)?))
        })?
        .command(exe, run_routine)?;

    node.set_flag_choices("exe", "--file", routine_files(&config.routines_directory()));
    Ok(Box::new(node))
}

fn run_routine(_: &mut (), ctx: &mut CommandContext<'_>, args: &ParsedArgs) -> Result<Action> {
    let file = args.get_joined("file").unwrap_or_default();
    let path = resolve_routine(&file, &ctx.state.config.routines_directory());
    let substitution = Substitution::from_args(
        args.get_string("input")
            .map(|input| parse_routine_args(&input))
            .unwrap_or_default(),
    );

    let prepared = match RoutineRunner::prepare(&path, &substitution, false) {
        Ok(prepared) => prepared,
        Err(e @ (Error::RoutineNotFound { .. } | Error::EmptyRoutine { .. })) => {
            ctx.state.console.print(e);
            return Ok(Action::Stay);
        }
        Err(e) => return Err(e),
    };

    if let Some(dir) = prepared.export_directory {
        ctx.state.config.preferences.export_directory = dir;
    }
    Ok(Action::Queue(prepared.queue))
}

/// Existing paths are used as given; others are looked up in `routines`,
/// adding the routine extension when missing
fn resolve_routine(file: &str, routines: &Path) -> PathBuf {
    let given = PathBuf::from(file);
    if given.is_absolute() || given.exists() {
        return given;
    }

    let candidate = routines.join(&given);
    if candidate.exists() || candidate.extension().is_some() {
        candidate
    } else {
        candidate.with_extension(ROUTINE_EXTENSION)
    }
}

fn routine_files(routines: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(routines) else {
        return Vec::new();
    };

    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == ROUTINE_EXTENSION))
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();
    files.sort();
    files
}
