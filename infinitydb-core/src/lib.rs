//! # InfinityDB Core
//!
//! The component model and token codec shared by the InfinityDB client
//! crates.
//!
//! This crate provides:
//! - [`Component`]: the typed elements of a key, including the
//!   [`EntityClass`], [`Attribute`] and [`Index`] markers
//! - [`Item`]: a full key, and its decomposition into Tuple [`Segment`]s
//! - The token codec for the line-oriented Item format
//!   ([`parse_components`], [`encode_string`])
//!
//! Everything here is pure and synchronous; no I/O.
//!
//! ## Example
//!
//! ```
//! use infinitydb_core::{parse_primitive, Component};
//!
//! assert_eq!(parse_primitive("42").unwrap(), Component::Int(42));
//! assert!(parse_primitive("Gene").unwrap().is_marker());
//! assert!(Component::entity_class("gene").is_err());
//! ```

pub mod component;
pub mod error;
pub mod item;
pub mod token;

pub use component::{
    is_legal_attribute_name, is_legal_entity_class_name, parse_date, parse_primitive,
    render_date, render_float, Attribute, Component, EntityClass, Index, MarkerId,
};
pub use error::{CoreError, Result};
pub use item::{Item, Segment};
pub use token::{encode_string, parse_components, parse_lines, parse_quoted};
