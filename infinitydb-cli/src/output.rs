use crate::error::CliResult;
use infinitydb_json::{quote, to_extended_text, Tree};

/// Output format for trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatKind {
    /// Extended JSON text with unquoted components
    Text,
    /// Underscore-quoted plain JSON
    Json,
}

pub fn format_tree(tree: &Tree, format: OutputFormatKind) -> CliResult<String> {
    match format {
        OutputFormatKind::Text => Ok(to_extended_text(tree)),
        OutputFormatKind::Json => {
            let json = quote(tree)?;
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}
