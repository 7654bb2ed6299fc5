//! Command-line argument parsing

use std::path::PathBuf;
use thiserror::Error;

pub const USAGE: &str = "\
Usage:
  advisor run <lead.json> [--config <path>] [--market <file>] [--json] [--write-back]
  advisor init       Print a sample .advisor.toml
  advisor serve [--port <port>]
  advisor version";

/// Argument errors
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("no command given")]
    MissingCommand,

    #[error("missing lead file")]
    MissingLead,

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// Options for `advisor run`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    /// Lead JSON file
    pub lead: PathBuf,
    /// Explicit config file, bypassing the lookup order
    pub config: Option<PathBuf>,
    /// Market snapshot file, overriding `[market]`
    pub market: Option<PathBuf>,
    /// Print the outcome as JSON instead of the script
    pub json: bool,
    /// Apply the run's effects to the lead file
    pub write_back: bool,
}

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(RunArgs),
    Init,
    Serve { port: u16 },
    Version,
    Help,
}

/// Parse arguments (without the program name)
pub fn parse<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Err(CliError::MissingCommand);
    };

    match command.as_str() {
        "run" => parse_run(args).map(Command::Run),
        "init" => Ok(Command::Init),
        "serve" => {
            let mut port = 8080;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--port" | "-p" => {
                        let value = args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                        port = value.parse().map_err(|_| CliError::InvalidPort(value))?;
                    }
                    _ => return Err(CliError::UnknownOption(arg)),
                }
            }
            Ok(Command::Serve { port })
        }
        "version" | "--version" | "-V" => Ok(Command::Version),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => Err(CliError::UnknownCommand(command)),
    }
}

fn parse_run(mut args: impl Iterator<Item = String>) -> Result<RunArgs, CliError> {
    let mut lead = None;
    let mut run = RunArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                run.config = Some(PathBuf::from(
                    args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?,
                ));
            }
            "--market" | "-m" => {
                run.market = Some(PathBuf::from(
                    args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?,
                ));
            }
            "--json" => run.json = true,
            "--write-back" => run.write_back = true,
            _ if !arg.starts_with('-') && lead.is_none() => {
                lead = Some(PathBuf::from(arg));
            }
            _ => return Err(CliError::UnknownOption(arg)),
        }
    }

    run.lead = lead.ok_or(CliError::MissingLead)?;
    Ok(run)
}
