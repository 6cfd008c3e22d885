use crate::error::{CliError, CliResult};
use crate::input::parse_item;
use crate::output::{format_tree, OutputFormatKind};
use infinitydb_remote::{Accessor, RequestOptions};

pub async fn run(accessor: &Accessor, path: &str, format: OutputFormatKind) -> CliResult<()> {
    let path = parse_item(path)?;
    let tree = accessor
        .get_json(&path, &RequestOptions::new())
        .await?
        .ok_or_else(|| CliError::NotFound(format!("nothing under '{path}'")))?;
    println!("{}", format_tree(&tree, format)?);
    Ok(())
}

pub async fn items(accessor: &Accessor, path: &str, limit: Option<i64>) -> CliResult<()> {
    let path = parse_item(path)?;
    let mut options = RequestOptions::new();
    if let Some(limit) = limit {
        options = options.param("limit", limit);
    }
    let items = accessor.get_items(&path, &options).await?.unwrap_or_default();
    for item in items {
        println!("{item}");
    }
    Ok(())
}
