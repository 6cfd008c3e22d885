use crate::error::CliResult;
use crate::input::parse_item;
use infinitydb_remote::{Accessor, RequestOptions};

pub async fn exists(accessor: &Accessor, item: &str) -> CliResult<bool> {
    let item = parse_item(item)?;
    let found = accessor.exists(&item, &RequestOptions::new()).await?;
    println!("{found}");
    Ok(found)
}

pub async fn insert(accessor: &mut Accessor, item: &str) -> CliResult<()> {
    let item = parse_item(item)?;
    accessor.insert_item(&item, &RequestOptions::new()).await?;
    Ok(())
}

pub async fn delete(accessor: &mut Accessor, item: &str, subspace: bool) -> CliResult<()> {
    let item = parse_item(item)?;
    let options = RequestOptions::new();
    if subspace {
        accessor.delete_subspace(&item, &options).await?;
    } else {
        accessor.delete_item(&item, &options).await?;
    }
    Ok(())
}

pub async fn commit(accessor: &mut Accessor) -> CliResult<()> {
    accessor.commit(&RequestOptions::new()).await?;
    Ok(())
}
