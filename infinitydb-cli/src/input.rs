use crate::error::{CliError, CliResult};
use infinitydb_core::Item;
use infinitydb_json::{from_json_slice, Tree};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Where a JSON body comes from.
pub enum InputSource {
    File(PathBuf),
    /// From the `-e` inline expression.
    Inline(String),
    /// From stdin (piped).
    Stdin,
}

/// Resolve the input source with priority: `-e` > file > stdin.
pub fn resolve_input(expr: Option<&str>, file: Option<&Path>) -> CliResult<InputSource> {
    if let Some(e) = expr {
        return Ok(InputSource::Inline(e.to_string()));
    }
    if let Some(f) = file {
        return Ok(InputSource::File(f.to_path_buf()));
    }
    if !io::stdin().is_terminal() {
        return Ok(InputSource::Stdin);
    }
    Err(CliError::Input(format!(
        "no input provided\n  {} pass a file, use -e for inline JSON, or pipe via stdin",
        colored::Colorize::bold(colored::Colorize::cyan("help:"))
    )))
}

pub fn read_input(source: &InputSource) -> CliResult<String> {
    match source {
        InputSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("failed to read {}: {e}", path.display()))),
        InputSource::Inline(s) => Ok(s.clone()),
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Read and decode an underscore-quoted JSON body.
pub fn read_tree(expr: Option<&str>, file: Option<&Path>) -> CliResult<Tree> {
    let text = read_input(&resolve_input(expr, file)?)?;
    Ok(from_json_slice(text.as_bytes())?)
}

/// Parse an Item or prefix given in token form. The empty string is the
/// root.
pub fn parse_item(text: &str) -> CliResult<Item> {
    Ok(text.parse()?)
}
