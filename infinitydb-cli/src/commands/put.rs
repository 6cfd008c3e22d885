use crate::error::CliResult;
use crate::input::{parse_item, read_tree};
use infinitydb_json::compact;
use infinitydb_remote::{Accessor, RequestOptions};
use std::path::Path;
use tracing::info;

pub async fn run(
    accessor: &mut Accessor,
    path: &str,
    file: Option<&Path>,
    expr: Option<&str>,
) -> CliResult<()> {
    let path = parse_item(path)?;
    let tree = compact(read_tree(expr, file)?);
    accessor.put_json(&path, &tree, &RequestOptions::new()).await?;
    info!(path = %path, "Wrote subtree");
    Ok(())
}
