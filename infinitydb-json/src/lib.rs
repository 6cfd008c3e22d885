//! Tree encoding for the InfinityDB REST interface
//!
//! This library provides:
//! - [`Tree`]: nested values with component keys
//! - Underscore quoting to and from plain JSON ([`quote`], [`unquote`])
//! - Extended JSON text for display ([`to_extended_text`])
//! - List conversion ([`listify`], [`indexify`])
//! - Tuple flattening ([`flatten`], [`unflatten`]) and tip compaction
//!   ([`compact`], [`uncompact`])
//!
//! # Example
//!
//! ```
//! use infinitydb_core::Component;
//! use infinitydb_json::{from_json_slice, flatten, Key, Tree};
//!
//! let tree = from_json_slice(br#"{"_Gene": {"g1": {"_start": 100}}}"#).unwrap();
//! let gene = Component::entity_class("Gene").unwrap();
//! assert!(tree.get(gene.clone()).is_some());
//!
//! // {Gene: {("g1",): {start: {(100,): null}}}}
//! let flat = flatten(tree).unwrap();
//! let g1 = flat.get(gene).unwrap().as_map().unwrap();
//! assert!(g1.contains_key(&Key::Tuple(vec![Component::from("g1")])));
//! ```

pub mod error;
pub mod flatten;
pub mod lists;
pub mod quote;
pub mod text;
pub mod tips;
pub mod tree;

pub use error::{Result, TreeError};
pub use flatten::{flatten, flatten_to_tuples, unflatten, unflatten_from_tuples, TipMode};
pub use lists::{indexify, listify, ListifyOptions, MAX_INDEX_GAP};
pub use quote::{
    from_json_slice, quote, quote_component_key, quote_key, quote_value, to_json_bytes, unquote,
    unquote_str,
};
pub use text::to_extended_text;
pub use tips::{compact, uncompact};
pub use tree::{Key, Mapping, Tree};
