//! Argument parsing for menu commands
//!
//! Every command declares a [`CommandSchema`]: a `clap::Command` plus the
//! options shared across the terminal (`--export`, `--sheet-name`, `--raw`,
//! `-l/--limit`). Parsing never exits the process. Help output and parse
//! failures are printed to the console and reported as a [`DispatchError`]
//! so the caller can treat the command as a no-op.

use std::any::Any;

use clap::builder::PossibleValuesParser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::completion::{closest_match, CompletionIndex, SUGGESTION_CUTOFF};
use crate::config::Preferences;
use crate::console::Console;
use crate::error::DispatchError;
use crate::export::ExportFormat;

const EXPORT_ID: &str = "export";
const SHEET_NAME_ID: &str = "sheet_name";
const RAW_ID: &str = "raw";
const LIMIT_ID: &str = "limit";

/// Declarative flag schema of one command
#[derive(Debug, Clone)]
pub struct CommandSchema {
    command: Command,
    exports: Vec<ExportFormat>,
    default_flag: Option<String>,
}

impl CommandSchema {
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        let command = Command::new(name.into())
            .about(about.into())
            .no_binary_name(true)
            .disable_version_flag(true)
            .help_expected(false);

        Self {
            command,
            exports: Vec::new(),
            default_flag: None,
        }
    }

    /// Add a command-specific argument
    pub fn arg(mut self, arg: Arg) -> Self {
        self.command = self.command.arg(arg);
        self
    }

    /// Accept `--export` with the given formats, plus `--sheet-name` when
    /// xlsx is among them
    pub fn with_export(mut self, formats: &[ExportFormat]) -> Self {
        let names: Vec<&'static str> = formats.iter().map(|f| f.as_str()).collect();
        self.command = self.command.arg(
            Arg::new(EXPORT_ID)
                .long("export")
                .value_name("FORMAT")
                .help(format!("Export output to {}", names.join(", ")))
                .value_delimiter(',')
                .action(ArgAction::Append)
                .value_parser(PossibleValuesParser::new(names)),
        );

        if formats.contains(&ExportFormat::Xlsx) {
            self.command = self.command.arg(
                Arg::new(SHEET_NAME_ID)
                    .long("sheet-name")
                    .value_name("NAME")
                    .num_args(1..)
                    .help("Sheet name used with an xlsx export"),
            );
        }

        self.exports = formats.to_vec();
        self
    }

    /// Accept `--raw` to print the table instead of a chart
    pub fn with_raw(mut self) -> Self {
        self.command = self.command.arg(
            Arg::new(RAW_ID)
                .long("raw")
                .action(ArgAction::SetTrue)
                .help("Print raw data instead of a chart"),
        );
        self
    }

    /// Accept `-l/--limit` with a positive default
    pub fn with_limit(mut self, default: u64) -> Self {
        self.command = self.command.arg(
            Arg::new(LIMIT_ID)
                .short('l')
                .long("limit")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .default_value(default.max(1).to_string())
                .help("Number of rows to show"),
        );
        self
    }

    /// Treat a leading bare token as the value of `flag` (`load AAPL` is
    /// read as `load -t AAPL`)
    pub fn with_default_flag(mut self, flag: impl Into<String>) -> Self {
        self.default_flag = Some(flag.into());
        self
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    /// One-line description
    pub fn about(&self) -> String {
        self.command
            .get_about()
            .map(|about| about.to_string())
            .unwrap_or_default()
    }

    pub fn export_formats(&self) -> &[ExportFormat] {
        &self.exports
    }

    /// Every `-x`/`--long` spelling this schema accepts, including `-h/--help`
    pub fn flags(&self) -> Vec<String> {
        let mut flags = vec!["-h".to_string(), "--help".to_string()];
        for arg in self.command.get_arguments() {
            if let Some(short) = arg.get_short() {
                flags.push(format!("-{}", short));
            }
            if let Some(long) = arg.get_long() {
                flags.push(format!("--{}", long));
            }
        }
        flags
    }

    /// Flags and their possible values as a completion subtree
    pub fn completion(&self) -> CompletionIndex {
        let mut index = CompletionIndex::new();
        for arg in self.command.get_arguments() {
            let values: Vec<String> = if arg.get_action().takes_values() {
                arg.get_possible_values()
                    .iter()
                    .map(|value| value.get_name().to_string())
                    .collect()
            } else {
                Vec::new()
            };
            let spellings = arg
                .get_long()
                .map(|long| format!("--{}", long))
                .into_iter()
                .chain(arg.get_short().map(|short| format!("-{}", short)));
            for spelling in spellings {
                index.set_values(spelling, values.iter().cloned());
            }
        }
        index.insert("--help");
        index
    }

    /// Rendered usage text
    pub fn usage(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Parse `tokens` (without the command name).
    ///
    /// Tokens clap does not recognise are dropped and reported; parsing then
    /// continues with the rest.
    pub fn parse(
        &self,
        tokens: &[String],
        console: &mut Console,
        preferences: &Preferences,
    ) -> Result<ParsedArgs, DispatchError> {
        if preferences.use_clear_after_cmd {
            console.clear_screen();
        }

        let mut tokens = self.apply_default_flag(tokens);
        let mut unknown: Vec<String> = Vec::new();

        let matches = loop {
            match self.command.clone().try_get_matches_from(&tokens) {
                Ok(matches) => break matches,
                Err(err) => match err.kind() {
                    ErrorKind::DisplayHelp
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        console.print(err.render());
                        return Err(DispatchError::HelpRequested);
                    }
                    ErrorKind::UnknownArgument => {
                        let position = match err.get(ContextKind::InvalidArg) {
                            Some(ContextValue::String(arg)) => tokens
                                .iter()
                                .position(|t| t == arg || t.starts_with(&format!("{}=", arg))),
                            _ => None,
                        };
                        match position {
                            Some(position) => unknown.push(tokens.remove(position)),
                            None => return Err(self.fail(console, err.render().to_string())),
                        }
                    }
                    _ => return Err(self.fail(console, err.render().to_string())),
                },
            }
        };

        if !unknown.is_empty() {
            self.report_unknown(console, &unknown);
        }

        let parsed = ParsedArgs::new(matches, unknown);

        if parsed.sheet_name.is_some() && !parsed.export.contains(&ExportFormat::Xlsx) {
            return Err(self.fail(
                console,
                "Use --sheet-name only together with an xlsx --export".to_string(),
            ));
        }

        Ok(parsed)
    }

    fn apply_default_flag(&self, tokens: &[String]) -> Vec<String> {
        let mut tokens = tokens.to_vec();
        if let (Some(flag), Some(first)) = (&self.default_flag, tokens.first()) {
            if !first.starts_with('-') {
                tokens.insert(0, flag.clone());
            }
        }
        tokens
    }

    fn report_unknown(&self, console: &mut Console, unknown: &[String]) {
        console.print(format!(
            "The following args couldn't be interpreted: {:?}",
            unknown
        ));

        let flags = self.flags();
        for arg in unknown.iter().filter(|arg| arg.starts_with('-')) {
            let name = arg.split('=').next().unwrap_or(arg);
            if let Some(suggestion) =
                closest_match(name, flags.iter().map(String::as_str), SUGGESTION_CUTOFF)
            {
                console.print(format!("Did you mean '{}'?", suggestion));
            }
        }
        console.newline();
    }

    fn fail(&self, console: &mut Console, message: String) -> DispatchError {
        console.print(message.trim_end());
        console.newline();
        debug!("Parsing '{}' failed: {}", self.name(), message.trim_end());
        DispatchError::ParseFailed {
            reason: message.lines().next().unwrap_or_default().to_string(),
        }
    }
}

/// Options parsed for one command invocation
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    matches: ArgMatches,
    /// Requested export formats, empty when not exporting
    pub export: Vec<ExportFormat>,
    pub sheet_name: Option<String>,
    /// `--raw` was given
    pub raw: bool,
    /// `-l/--limit` when the command accepts it
    pub limit: Option<usize>,
    /// Tokens that could not be interpreted
    pub unknown: Vec<String>,
}

impl ParsedArgs {
    fn new(matches: ArgMatches, unknown: Vec<String>) -> Self {
        let export = strings(&matches, EXPORT_ID)
            .iter()
            .filter_map(|name| name.parse().ok())
            .fold(Vec::new(), |mut acc: Vec<ExportFormat>, format| {
                if !acc.contains(&format) {
                    acc.push(format);
                }
                acc
            });
        let sheet_name = Some(strings(&matches, SHEET_NAME_ID).join(" ")).filter(|s| !s.is_empty());
        let raw = flag(&matches, RAW_ID);
        let limit = matches
            .try_get_one::<u64>(LIMIT_ID)
            .ok()
            .flatten()
            .map(|l| *l as usize);

        Self {
            matches,
            export,
            sheet_name,
            raw,
            limit,
            unknown,
        }
    }

    /// Underlying clap matches
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// Typed single value; `None` when absent or not declared
    pub fn get_one<T: Any + Clone + Send + Sync + 'static>(&self, id: &str) -> Option<T> {
        self.matches.try_get_one::<T>(id).ok().flatten().cloned()
    }

    pub fn get_string(&self, id: &str) -> Option<String> {
        self.get_one::<String>(id)
    }

    /// All string values of a multi-valued argument
    pub fn get_many(&self, id: &str) -> Vec<String> {
        strings(&self.matches, id)
    }

    /// Multi-valued argument joined with spaces, `None` when empty
    pub fn get_joined(&self, id: &str) -> Option<String> {
        Some(self.get_many(id).join(" ")).filter(|s| !s.is_empty())
    }

    pub fn get_flag(&self, id: &str) -> bool {
        flag(&self.matches, id)
    }

    pub fn is_exporting(&self) -> bool {
        !self.export.is_empty()
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .try_get_many::<String>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
