//! Accessor configuration
//!
//! Read from TOML, optionally overridden by `INFINITYDB_*` environment
//! variables:
//!
//! ```toml
//! server_url = "https://infinitydb.com:37411/infinitydb/data"
//! db = "demo/readonly"
//! user = "testUser"
//! password = "db"
//! batch_size = 500
//!
//! [default_parameters]
//! limit = 100
//! ```

use crate::error::{RemoteError, Result};
use crate::params::{ParamValue, QueryParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ENV_URL: &str = "INFINITYDB_URL";
pub const ENV_DB: &str = "INFINITYDB_DB";
pub const ENV_USER: &str = "INFINITYDB_USER";
pub const ENV_PASSWORD: &str = "INFINITYDB_PASSWORD";

pub const DEFAULT_BATCH_SIZE: usize = 1000;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// How to reach one server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessorConfig {
    /// Base URL; the database name and key path are appended to it
    pub server_url: String,
    /// Database used when a call does not name one
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Items fetched per refill of the next buffer
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Query parameters sent with every request unless a call overrides them
    #[serde(default)]
    pub default_parameters: BTreeMap<String, ParamValue>,
}

impl AccessorConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            db: None,
            user: None,
            password: None,
            accept_invalid_certs: false,
            timeout_secs: None,
            batch_size: DEFAULT_BATCH_SIZE,
            default_parameters: BTreeMap::new(),
        }
    }

    pub fn with_db(mut self, db: impl Into<String>) -> Self {
        self.db = Some(db.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RemoteError::Config(format!("invalid TOML: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RemoteError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `INFINITYDB_URL`, `INFINITYDB_DB`, `INFINITYDB_USER` and
    /// `INFINITYDB_PASSWORD`; empty values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(url) = get(ENV_URL) {
            self.server_url = url;
        }
        if let Some(db) = get(ENV_DB) {
            self.db = Some(db);
        }
        if let Some(user) = get(ENV_USER) {
            self.user = Some(user);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.password = Some(password);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(RemoteError::Config("server_url is required".to_string()));
        }
        if self.batch_size == 0 {
            return Err(RemoteError::Config("batch_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Server URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub fn default_query_params(&self) -> QueryParams {
        self.default_parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
