use crate::error::CliResult;
use infinitydb_remote::AccessorConfig;
use std::path::Path;

/// Looked for in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "infinitydb.toml";

/// Build the accessor configuration.
///
/// Precedence, lowest first: config file, `INFINITYDB_*` environment
/// variables, `--url` / `--db` flags.
pub fn resolve(
    config_path: Option<&Path>,
    url: Option<&str>,
    db: Option<&str>,
) -> CliResult<AccessorConfig> {
    let base = match config_path {
        Some(path) => AccessorConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            AccessorConfig::load(DEFAULT_CONFIG_FILE)?
        }
        None => AccessorConfig::new(""),
    };
    let config = apply_flags(base.with_env_overrides(), url, db);
    config.validate()?;
    Ok(config)
}

fn apply_flags(mut config: AccessorConfig, url: Option<&str>, db: Option<&str>) -> AccessorConfig {
    if let Some(url) = url {
        config.server_url = url.to_string();
    }
    if let Some(db) = db {
        config.db = Some(db.to_string());
    }
    config
}
