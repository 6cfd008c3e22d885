use colored::Colorize;
use infinitydb_core::CoreError;
use infinitydb_json::TreeError;
use infinitydb_remote::RemoteError;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Error from the server or the client library.
    Remote(RemoteError),
    /// Missing or unreadable configuration.
    Config(String),
    /// Unreadable input or a body that is not valid JSON.
    Input(String),
    /// Nothing at the requested prefix.
    NotFound(String),
    /// Argument / usage errors, including Items that do not parse.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Remote(RemoteError::MissingDatabase) => write!(
                f,
                "{} no database selected\n  {} pass --db or set INFINITYDB_DB",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Remote(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Config(msg) => write!(
                f,
                "{} {msg}\n  {} pass --url or --config, or set INFINITYDB_URL",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::NotFound(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<RemoteError> for CliError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Config(msg) => CliError::Config(msg),
            other => CliError::Remote(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Usage(format!("invalid Item: {e}"))
    }
}

impl From<TreeError> for CliError {
    fn from(e: TreeError) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
