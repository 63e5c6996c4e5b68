use clap::Arg;
use serde_json::json;

use crate::error::Result;
use crate::menu::{Action, CommandContext, Menu, MenuNode, MenuPath};
use crate::parser::{CommandSchema, ParsedArgs};

use super::dd;

/// Dates such as `2024/01/31` are never split into commands
const DATE_PATTERN: &str = r"\d{4}/\d{2}/\d{2}";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StocksState {
    /// Loaded ticker, upper case
    pub ticker: Option<String>,
}

/// `/stocks/` under `parent`
pub fn stocks_menu(parent: &MenuPath) -> Result<Box<dyn Menu>> {
    let load = CommandSchema::new("load", "Load a ticker")
        .arg(
            Arg::new("ticker")
                .short('t')
                .long("ticker")
                .required(true)
                .help("Ticker symbol"),
        )
        .arg(
            Arg::new("start")
                .short('s')
                .long("start")
                .value_name("YYYY/MM/DD")
                .help("First date of the loaded history"),
        )
        .with_default_flag("-t");

    let node = MenuNode::new(parent.child("stocks")?, "Stocks", StocksState::default())
        .command(load, load_ticker)?
        .submenu(
            CommandSchema::new("dd", "Due diligence on the loaded ticker"),
            enter_dd,
        )?
        .protect(DATE_PATTERN)
        .on_reset(|state: &StocksState| {
            state
                .ticker
                .iter()
                .map(|ticker| format!("load {}", ticker))
                .collect()
        });

    Ok(Box::new(node))
}

fn load_ticker(state: &mut StocksState, ctx: &mut CommandContext<'_>, args: &ParsedArgs) -> Result<Action> {
    let ticker = args.get_string("ticker").unwrap_or_default().to_uppercase();
    let start = args.get_string("start");
    ctx.state.results.register(
        Some(ticker.clone()),
        format!("{}load", ctx.path),
        json!({ "ticker": ticker, "start": start }),
    );
    match &start {
        Some(start) => ctx.state.console.print(format!("Loaded {} from {}", ticker, start)),
        None => ctx.state.console.print(format!("Loaded {}", ticker)),
    }
    state.ticker = Some(ticker);
    Ok(Action::Stay)
}

fn enter_dd(state: &mut StocksState, ctx: &mut CommandContext<'_>, _: &ParsedArgs) -> Result<Action> {
    match &state.ticker {
        Some(ticker) => Ok(Action::Enter(dd::dd_menu(ctx.path, ticker)?)),
        None => {
            ctx.state.console.print("Load a ticker first, e.g. 'load AAPL'.");
            Ok(Action::Stay)
        }
    }
}
