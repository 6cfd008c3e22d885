//! Tip compaction
//!
//! The server treats `x` and `{x: null}` as the same singleton, and treats
//! an empty mapping as nothing at all. [`compact`] collapses one-entry leaf
//! mappings into bare values so that a write does not send `{}` where a
//! key was meant; [`uncompact`] expands bare values back into
//! `{value: null}` form. Both are idempotent.

use crate::tree::{Key, Mapping, Tree};

/// Collapse degenerate one-entry mappings, bottom up.
///
/// A one-entry mapping `{k: {}}`, `{k: null}` or `{(k,): null}` becomes
/// the bare `k`; `{(a, b): {}}` becomes the bare Tuple. Inside a mapping
/// with several entries an empty-mapping value becomes null.
pub fn compact(tree: Tree) -> Tree {
    match tree {
        Tree::Map(map) => compact_map(map),
        Tree::List(items) => Tree::List(items.into_iter().map(compact).collect()),
        other => other,
    }
}

fn compact_map(map: Mapping) -> Tree {
    let single = map.len() == 1;
    let compacted: Mapping = map
        .into_iter()
        .map(|(k, v)| {
            let v = compact(v);
            if !single && v.is_empty_map() {
                (k, Tree::null())
            } else {
                (k, v)
            }
        })
        .collect();

    let collapses = match compacted.single_entry() {
        Some((Key::Tuple(t), v)) => v.is_empty_map() || (t.len() == 1 && v.is_null()),
        Some((Key::Component(_), v)) => v.is_empty_map() || v.is_null(),
        None => false,
    };
    if !collapses {
        return Tree::Map(compacted);
    }
    match compacted.into_iter().next() {
        Some((key, _)) => key.into_tree(),
        None => Tree::empty_map(),
    }
}

/// Expand bare leaf values into `{value: null}` mappings.
///
/// `{k: v}` with a scalar or Tuple `v` becomes `{k: {v: null}}`, a
/// `{(k,): null}` entry becomes `{k: null}`, and a bare top-level value
/// becomes `{value: null}`. Null values are left alone.
pub fn uncompact(tree: Tree) -> Tree {
    match tree {
        Tree::Map(map) => Tree::Map(
            map.into_iter()
                .map(|(k, v)| match (k, v) {
                    (Key::Tuple(mut t), v) if t.len() == 1 && v.is_null() => {
                        (Key::Component(t.remove(0)), v)
                    }
                    (k, Tree::Scalar(c)) if !c.is_null() => {
                        (k, Tree::Map(Mapping::single(c, Tree::null())))
                    }
                    (k, Tree::Tuple(t)) => (k, Tree::Map(Mapping::single(Key::Tuple(t), Tree::null()))),
                    (k, v) => (k, uncompact(v)),
                })
                .collect(),
        ),
        Tree::List(items) => Tree::List(items.into_iter().map(uncompact).collect()),
        Tree::Scalar(c) if !c.is_null() => Tree::Map(Mapping::single(c, Tree::null())),
        Tree::Tuple(t) => Tree::Map(Mapping::single(Key::Tuple(t), Tree::null())),
        other => other,
    }
}
