//! Conversion between nested mappings and Tuple-keyed mappings
//!
//! In the nested form every component of an Item is its own mapping level:
//!
//! ```text
//! {Gene: {"g1": {start: 100}}}
//! ```
//!
//! In the flattened form each run of non-marker components between two
//! markers is collapsed into one Tuple key, and a marker whose subtree
//! starts with another marker keeps that subtree under the empty Tuple:
//!
//! ```text
//! {Gene: {("g1",): {start: {(100,): null}}}}
//! ```
//!
//! Tuple keys match how queries address data. [`flatten_to_tuples`] and
//! [`unflatten_from_tuples`] combine this with list conversion and tip
//! compaction.

use crate::error::{Result, TreeError};
use crate::lists::{indexify, listify, ListifyOptions};
use crate::tips::{compact, uncompact};
use crate::tree::{Key, Mapping, Tree};
use infinitydb_core::Component;

/// What to do with the leaves after flattening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TipMode {
    /// Leave the tips as flattening produced them
    #[default]
    Keep,
    /// Apply [`compact`]
    Compact,
    /// Apply [`uncompact`]
    Uncompact,
}

impl From<Option<bool>> for TipMode {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => TipMode::Keep,
            Some(true) => TipMode::Compact,
            Some(false) => TipMode::Uncompact,
        }
    }
}

/// Collapse runs of non-marker keys into Tuple keys.
///
/// A non-null scalar leaf `v` under path `k...` becomes the entry
/// `(k..., v): null`; an empty mapping under `k...` becomes `(k...): null`.
/// Lists are kept, with their elements flattened. A marker inside a Tuple
/// key is a [`TreeError::StructuralViolation`].
pub fn flatten(tree: Tree) -> Result<Tree> {
    match tree {
        Tree::Map(map) => flatten_map(map).map(Tree::Map),
        Tree::List(items) => items
            .into_iter()
            .map(flatten)
            .collect::<Result<Vec<_>>>()
            .map(Tree::List),
        Tree::Scalar(Component::Null) => Ok(Tree::null()),
        Tree::Scalar(c) if c.is_marker() => Ok(Tree::Map(Mapping::single(c, Tree::null()))),
        Tree::Scalar(c) => Ok(Tree::Map(Mapping::single(Key::Tuple(vec![c]), Tree::null()))),
        Tree::Tuple(t) => {
            check_tuple(&t)?;
            Ok(Tree::Map(Mapping::single(Key::Tuple(t), Tree::null())))
        }
    }
}

fn check_tuple(components: &[Component]) -> Result<()> {
    match components.iter().find(|c| c.is_marker()) {
        Some(marker) => Err(TreeError::structural(format!(
            "marker {marker} cannot appear inside a Tuple"
        ))),
        None => Ok(()),
    }
}

fn flatten_map(map: Mapping) -> Result<Mapping> {
    let mut flat = Mapping::new();
    for (key, value) in map {
        let nested = flatten(value)?;
        match key {
            Key::Component(c) if c.is_marker() => place_under_marker(&mut flat, c, nested),
            Key::Component(c) => place_under_run(&mut flat, vec![c], nested),
            Key::Tuple(run) => {
                check_tuple(&run)?;
                place_under_run(&mut flat, run, nested);
            }
        }
    }
    Ok(flat)
}

// A flattened mapping has only marker keys and Tuple keys. Under a marker
// the Tuple entries stay as they are and the marker entries move under ().
fn place_under_marker(flat: &mut Mapping, marker: Component, nested: Tree) {
    let value = match nested {
        Tree::Map(inner) if inner.is_empty() => Tree::null(),
        Tree::Map(inner) => {
            let mut under = Mapping::new();
            let mut markers = Mapping::new();
            for (k, v) in inner {
                if k.is_marker() {
                    markers.merge(k, v);
                } else {
                    under.merge(k, v);
                }
            }
            if !markers.is_empty() {
                under.merge(Key::Tuple(Vec::new()), markers);
            }
            Tree::Map(under)
        }
        other => other,
    };
    flat.merge(marker, value);
}

// The run is prepended to every Tuple key below it; marker entries below
// stay together under the run itself.
fn place_under_run(flat: &mut Mapping, run: Vec<Component>, nested: Tree) {
    match nested {
        Tree::Map(inner) if inner.is_empty() => flat.merge(Key::Tuple(run), Tree::null()),
        Tree::Map(inner) => {
            let mut markers = Mapping::new();
            for (k, v) in inner {
                match k {
                    Key::Tuple(rest) => {
                        let mut joined = run.clone();
                        joined.extend(rest);
                        flat.merge(Key::Tuple(joined), v);
                    }
                    marker => markers.merge(marker, v),
                }
            }
            if !markers.is_empty() {
                flat.merge(Key::Tuple(run), markers);
            }
        }
        other => flat.merge(Key::Tuple(run), other),
    }
}

/// Expand Tuple keys back into nested mappings.
///
/// A key `(a, b)` becomes `a` holding `{b: ...}`; the empty Tuple splices
/// its mapping into the parent. Entries that land on the same key are
/// merged. A bare Tuple value becomes nested mappings ending in null.
pub fn unflatten(tree: Tree) -> Result<Tree> {
    match tree {
        Tree::Map(map) => unflatten_map(map).map(Tree::Map),
        Tree::List(items) => items
            .into_iter()
            .map(unflatten)
            .collect::<Result<Vec<_>>>()
            .map(Tree::List),
        Tree::Tuple(t) => Ok(nest(t, Tree::null())),
        scalar => Ok(scalar),
    }
}

fn nest(components: Vec<Component>, leaf: Tree) -> Tree {
    components
        .into_iter()
        .rev()
        .fold(leaf, |inner, c| Tree::Map(Mapping::single(c, inner)))
}

fn unflatten_map(map: Mapping) -> Result<Mapping> {
    let mut out = Mapping::new();
    for (key, value) in map {
        let value = unflatten(value)?;
        match key {
            Key::Component(c) => out.merge(c, value),
            Key::Tuple(run) if run.is_empty() => match value {
                Tree::Map(inner) => {
                    for (k, v) in inner {
                        out.merge(k, v);
                    }
                }
                Tree::Scalar(Component::Null) => {}
                Tree::Scalar(c) => out.merge(c, Tree::null()),
                Tree::List(_) | Tree::Tuple(_) => {
                    return Err(TreeError::structural(
                        "the empty Tuple key can only hold a mapping or a single value",
                    ))
                }
            },
            Key::Tuple(run) => {
                let mut components = run.into_iter();
                if let Some(first) = components.next() {
                    out.merge(first, nest(components.collect(), value));
                }
            }
        }
    }
    Ok(out)
}

/// Prepare a tree for a Tuple-keyed query: convert lists, flatten, then
/// adjust tips.
///
/// With `flattened_lists` set, lists become Index-keyed mappings first;
/// otherwise Index-keyed mappings become lists.
pub fn flatten_to_tuples(tree: Tree, flattened_lists: bool, tips: TipMode) -> Result<Tree> {
    let tree = if flattened_lists {
        indexify(tree)
    } else {
        listify(tree, ListifyOptions::default())?
    };
    let flat = flatten(tree)?;
    Ok(match tips {
        TipMode::Keep => flat,
        TipMode::Compact => compact(flat),
        TipMode::Uncompact => uncompact(flat),
    })
}

/// Inverse of [`flatten_to_tuples`]: unflatten, then optionally turn
/// Index-keyed mappings into lists.
pub fn unflatten_from_tuples(tree: Tree, realize_lists: bool) -> Result<Tree> {
    let tree = unflatten(tree)?;
    if realize_lists {
        listify(tree, ListifyOptions::default())
    } else {
        Ok(tree)
    }
}
