//! REST access to an InfinityDB server
//!
//! - [`RemoteClient`]: one request per operation (reads, writes, queries,
//!   single-step moves, commit)
//! - [`NextBuffer`]: batched `next` over `as-items-batch`
//! - [`Accessor`]: a client plus its buffer, built from [`AccessorConfig`]
//!
//! ```no_run
//! use infinitydb_core::Component;
//! use infinitydb_remote::{Accessor, AccessorConfig, RequestOptions};
//!
//! # async fn demo() -> infinitydb_remote::Result<()> {
//! let config = AccessorConfig::new("https://infinitydb.com:37411/infinitydb/data")
//!     .with_db("demo/readonly")
//!     .with_credentials("testUser", "db");
//! let accessor = Accessor::from_config(&config)?;
//!
//! let path = [Component::entity_class("Documentation").unwrap()];
//! let docs = accessor.get_json(&path, &RequestOptions::new()).await?;
//! # let _ = docs;
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod client;
pub mod config;
pub mod cursor;
pub mod error;
pub mod params;
pub mod path;
pub mod transport;

pub use accessor::Accessor;
pub use client::{
    Action, Blob, HeadStatus, Move, QueryOptions, QueryResponse, RemoteClient, RequestOptions,
};
pub use config::AccessorConfig;
pub use cursor::{BatchSource, Bound, NextBuffer};
pub use error::{RemoteError, Result};
pub use params::{ParamValue, QueryParams};
pub use path::{escape_component, escape_path};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
