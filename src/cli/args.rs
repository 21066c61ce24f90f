//! Command-line argument parsing for the chatline driver.

use thiserror::Error;

/// Usage text printed for `--help`.
pub const USAGE: &str = "\
Usage: chatline [OPTIONS]

Reads messages from stdin, one per line, and streams each reply to stdout.

Options:
  --base-url URL     Chat server origin (default from config or http://localhost:8000)
  --chat ID          Continue an existing chat, loading its history first
  --session COOKIE   Cookie header value sent with every request
  --list             Print your chats and exit
  -V, --version      Print version and exit
  -h, --help         Print this help and exit";

/// Settings given on the command line; unset fields fall back to config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub base_url: Option<String>,
    pub chat_id: Option<String>,
    pub session_cookie: Option<String>,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Print the chat list
    List(CliOptions),
    /// Interactive chat on stdin/stdout (default)
    Chat(CliOptions),
}

/// Malformed command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("option {0} requires a value")]
    MissingValue(String),
    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Parse command-line arguments (program name first).
///
/// `--version` and `--help` win over everything else on the line. Options
/// accept both `--flag value` and `--flag=value`.
///
/// # Examples
///
/// ```
/// use chatline::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatline".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut list = false;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--list" => list = true,
            "--base-url" | "--chat" | "--session" => {
                let value = match inline {
                    Some(value) => value,
                    None => args
                        .next()
                        .ok_or_else(|| ArgsError::MissingValue(flag.clone()))?,
                };
                match flag.as_str() {
                    "--base-url" => options.base_url = Some(value),
                    "--chat" => options.chat_id = Some(value),
                    _ => options.session_cookie = Some(value),
                }
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }

    Ok(if list {
        CliCommand::List(options)
    } else {
        CliCommand::Chat(options)
    })
}
