use crate::error::CliResult;
use crate::input::{parse_item, read_tree};
use crate::output::{format_tree, OutputFormatKind};
use infinitydb_json::from_json_slice;
use infinitydb_remote::{Accessor, QueryOptions, QueryResponse, RequestOptions};
use std::io::Write;
use std::path::Path;

pub struct QueryArgs<'a> {
    pub path: &'a str,
    pub file: Option<&'a Path>,
    pub expr: Option<&'a str>,
    pub param: Option<&'a str>,
    pub flatten: bool,
}

pub async fn run(accessor: &mut Accessor, args: QueryArgs<'_>) -> CliResult<()> {
    let path = parse_item(args.path)?;
    let request = read_tree(args.expr, args.file)?;
    let request_parameter = args
        .param
        .map(|p| from_json_slice(p.as_bytes()))
        .transpose()?;
    let query = QueryOptions {
        flatten: args.flatten,
        request_parameter,
        ..QueryOptions::default()
    };

    match accessor
        .execute_query(&path, request, &query, &RequestOptions::new())
        .await?
    {
        Some(QueryResponse::Tree(tree)) => {
            println!("{}", format_tree(&tree, OutputFormatKind::Text)?)
        }
        Some(QueryResponse::Blob(blob)) => std::io::stdout().write_all(&blob.data)?,
        None => {}
    }
    Ok(())
}
