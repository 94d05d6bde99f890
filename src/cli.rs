// src/cli.rs

//! Command-line parsing.
//!
//! The grammar uses single-dash, multi-letter options in the shell style
//! (`-ErrorAction Stop`), so it is walked by hand; enumerated values go
//! through `clap::ValueEnum` for case-insensitive matching and error
//! messages.
//!
//! ```text
//! scripthost [ -Debug V | -ErrorAction V | -InformationAction V | -ProgressAction V
//!            | -VerboseAction V | -WarningAction V | -ExecutionPolicy V
//!            | -InputString | -OutputString ]...
//!            [ - | <command> ] [ positional-arg ... ]
//! ```

use std::ffi::OsString;

use crate::config::{Configuration, PreferenceKind};
use crate::errors::{HostError, Result};
use crate::modes::Mode;
use crate::types::{ActionPreference, ExecutionPolicy};

/// Token that selects Stdin-Script mode.
pub const STDIN_SCRIPT_TOKEN: &str = "-";

/// Parsed command line: a frozen configuration plus the selected mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Configuration,
    pub mode: Mode,
}

/// Parse the process arguments (without the program name).
pub fn parse() -> Result<CliArgs> {
    parse_os_from(std::env::args_os().skip(1))
}

/// Like [`parse_from`], but for raw OS arguments. An argument that is not
/// valid Unicode is rejected rather than altered.
pub fn parse_os_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let args = args
        .into_iter()
        .map(|arg| {
            arg.into_string().map_err(|raw| {
                HostError::invalid_argument(format!(
                    "argument is not valid Unicode: {}",
                    raw.to_string_lossy()
                ))
            })
        })
        .collect::<Result<Vec<String>>>()?;
    parse_from(args)
}

/// Parse an argument list left to right.
///
/// Options come first; the first non-option token (or `-`) selects the mode
/// and everything after it is passed through untouched as positional
/// arguments.
pub fn parse_from<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut config = Configuration::default();

    while let Some(token) = args.next() {
        let Some(option) = option_name(&token) else {
            let rest: Vec<String> = args.collect();
            let mode = if token == STDIN_SCRIPT_TOKEN {
                Mode::StdinScript { args: rest }
            } else {
                Mode::NamedCommand {
                    name: token,
                    args: rest,
                }
            };
            return Ok(CliArgs { config, mode });
        };

        if let Some(kind) = PreferenceKind::from_option(option) {
            let value: ActionPreference = parse_value(option, args.next())?;
            config.preferences.set(kind, value);
        } else if option.eq_ignore_ascii_case("ExecutionPolicy") {
            let value: ExecutionPolicy = parse_value(option, args.next())?;
            config.execution_policy = Some(value);
        } else if option.eq_ignore_ascii_case("InputString") {
            config.input_as_stream = true;
        } else if option.eq_ignore_ascii_case("OutputString") {
            config.output_as_string = true;
        } else {
            return Err(HostError::invalid_argument(format!(
                "unrecognized option '{token}'"
            )));
        }
    }

    Ok(CliArgs {
        config,
        mode: Mode::Repl,
    })
}

/// `Some(name)` if `token` looks like an option (`-Name`), `None` for a
/// command selector (including the bare `-`).
fn option_name(token: &str) -> Option<&str> {
    match token.strip_prefix('-') {
        Some(name) if !name.is_empty() => Some(name),
        _ => None,
    }
}

fn parse_value<T>(option: &str, value: Option<String>) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let value =
        value.ok_or_else(|| HostError::invalid_argument(format!("missing value for -{option}")))?;
    value
        .parse()
        .map_err(|e: String| HostError::invalid_argument(format!("-{option}: {e}")))
}
