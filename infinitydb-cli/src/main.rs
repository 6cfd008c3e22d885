mod cli;
mod commands;
mod config;
mod error;
mod input;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use error::{exit_with_error, EXIT_ERROR};
use infinitydb_remote::Accessor;
use output::OutputFormatKind;

fn init_tracing(cli: &Cli) {
    // --quiet silences everything; --verbose honours RUST_LOG or falls back
    // to info; the default keeps stdout and stderr clean.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    let config = config::resolve(cli.config.as_deref(), cli.url.as_deref(), cli.db.as_deref())?;
    let mut accessor = Accessor::from_config(&config)?;

    match cli.command {
        Commands::Head => commands::head::run(&accessor).await,

        Commands::Get { path, json } => {
            let format = if json {
                OutputFormatKind::Json
            } else {
                OutputFormatKind::Text
            };
            commands::get::run(&accessor, &path, format).await
        }

        Commands::Items { path, limit } => commands::get::items(&accessor, &path, limit).await,

        Commands::Put { path, file, expr } => {
            commands::put::run(&mut accessor, &path, file.as_deref(), expr.as_deref()).await
        }

        Commands::Query {
            path,
            file,
            expr,
            param,
            no_flatten,
        } => {
            let args = commands::query::QueryArgs {
                path: &path,
                file: file.as_deref(),
                expr: expr.as_deref(),
                param: param.as_deref(),
                flatten: !no_flatten,
            };
            commands::query::run(&mut accessor, args).await
        }

        Commands::Move {
            direction,
            prefix,
            bound,
        } => commands::cursor::step(&accessor, direction.into(), &prefix, bound.into()).await,

        Commands::Next {
            item,
            bound,
            count,
            batch_size,
        } => commands::cursor::next(&mut accessor, &item, bound.into(), count, batch_size).await,

        Commands::Exists { item } => {
            if !commands::item::exists(&accessor, &item).await? {
                std::process::exit(EXIT_ERROR);
            }
            Ok(())
        }

        Commands::Insert { item } => commands::item::insert(&mut accessor, &item).await,

        Commands::Delete { item, subspace } => {
            commands::item::delete(&mut accessor, &item, subspace).await
        }

        Commands::Commit => commands::item::commit(&mut accessor).await,
    }
}
