use crate::error::{CliError, CliResult};
use colored::Colorize;
use infinitydb_remote::Accessor;

pub async fn run(accessor: &Accessor) -> CliResult<()> {
    let status = accessor.head().await?;
    if !status.is_ok() {
        return Err(CliError::Remote(infinitydb_remote::RemoteError::transport(
            Some(status.status),
            status.reason,
        )));
    }
    println!(
        "{} {}/{}",
        "ok".green().bold(),
        accessor.server_url(),
        accessor.db().unwrap_or_default()
    );
    Ok(())
}
