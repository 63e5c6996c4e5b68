use chrono::{DateTime, Local};
use clap::Arg;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::export::{export_rows, ExportFormat};
use crate::menu::{Action, CommandContext, Menu, MenuNode, MenuPath};
use crate::parser::{CommandSchema, ParsedArgs};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub ticker: String,
    pub text: String,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DdState {
    pub ticker: String,
    pub notes: Vec<Note>,
}

/// `/stocks/dd/` for `ticker`
pub fn dd_menu(parent: &MenuPath, ticker: &str) -> Result<Box<dyn Menu>> {
    let note = CommandSchema::new("note", "Add a note on the ticker")
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .num_args(1..)
                .required(true)
                .help("Note text"),
        )
        .with_default_flag("-t");

    let notes = CommandSchema::new("notes", "Show the notes taken")
        .with_export(ExportFormat::DATA)
        .with_raw()
        .with_limit(10);

    let state = DdState {
        ticker: ticker.to_string(),
        notes: Vec::new(),
    };
    let node = MenuNode::new(parent.child("dd")?, format!("Due Diligence: {}", ticker), state)
        .command(note, add_note)?
        .command(notes, show_notes)?;

    Ok(Box::new(node))
}

fn add_note(state: &mut DdState, ctx: &mut CommandContext<'_>, args: &ParsedArgs) -> Result<Action> {
    let text = args.get_joined("text").unwrap_or_default();
    state.notes.push(Note {
        ticker: state.ticker.clone(),
        text,
        created_at: Local::now(),
    });
    ctx.state
        .console
        .print(format!("Note {} saved for {}", state.notes.len(), state.ticker));
    Ok(Action::Stay)
}

fn show_notes(state: &mut DdState, ctx: &mut CommandContext<'_>, args: &ParsedArgs) -> Result<Action> {
    let limit = args.limit.unwrap_or(state.notes.len());
    let shown: Vec<&Note> = state.notes.iter().rev().take(limit).collect();
    let rows: Vec<Value> = shown
        .iter()
        .map(|note| serde_json::to_value(note))
        .collect::<std::result::Result<_, _>>()?;

    if shown.is_empty() {
        ctx.state.console.print(format!("No notes for {} yet.", state.ticker));
    } else if args.raw {
        for row in &rows {
            ctx.state.console.print(row);
        }
    } else {
        for note in &shown {
            ctx.state.console.print(format!(
                "{}  {}",
                note.created_at.format("%Y-%m-%d %H:%M"),
                note.text
            ));
        }
    }

    ctx.state.results.register(
        Some(format!("{}_notes", state.ticker.to_lowercase())),
        format!("{}notes", ctx.path),
        Value::Array(rows.clone()),
    );

    let directory = ctx
        .state
        .config
        .preferences
        .export_directory
        .join(ctx.path.segments().collect::<Vec<_>>().join("_"));
    for format in &args.export {
        match export_rows(&directory, "notes", *format, &rows) {
            Ok(path) => ctx.state.console.print(format!("Saved file: {}", path.display())),
            Err(e) => ctx.state.console.print(e),
        }
    }

    Ok(Action::Stay)
}
