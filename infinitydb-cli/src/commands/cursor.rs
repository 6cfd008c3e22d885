use crate::error::CliResult;
use crate::input::parse_item;
use infinitydb_remote::{Accessor, Bound, Move, RequestOptions};

pub async fn step(accessor: &Accessor, direction: Move, prefix: &str, bound: Bound) -> CliResult<()> {
    let prefix = parse_item(prefix)?;
    if let Some(found) = accessor
        .move_to(direction, bound, &prefix, &RequestOptions::new())
        .await?
    {
        println!("{found}");
    }
    Ok(())
}

/// Print up to `count` successive Items, reading through the next buffer.
pub async fn next(
    accessor: &mut Accessor,
    item: &str,
    bound: Bound,
    count: usize,
    batch_size: Option<usize>,
) -> CliResult<()> {
    if let Some(size) = batch_size {
        accessor.set_next_buffer(true, size);
    }
    let mut current = parse_item(item)?;
    for _ in 0..count {
        match accessor.buffered_next(None, &current, bound).await? {
            Some(found) => {
                println!("{found}");
                current = found;
            }
            None => break,
        }
    }
    Ok(())
}
