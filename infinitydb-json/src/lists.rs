//! Conversion between Index-keyed mappings and lists
//!
//! In the database a list is stored as a mapping whose keys are all
//! [`Index`](infinitydb_core::Index) components. [`listify`] turns such
//! mappings into lists, [`indexify`] goes the other way.

use crate::error::{Result, TreeError};
use crate::tree::{Key, Mapping, Tree};
use infinitydb_core::Component;
use tracing::debug;

/// Options for [`listify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListifyOptions {
    /// Fail on a mapping that mixes Index and other keys instead of
    /// leaving it as a mapping
    pub strict: bool,
    /// Drop gaps between indexes instead of filling them with nulls
    pub collapse_sparseness: bool,
}

impl ListifyOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Widest gap between consecutive indexes that [`listify`] fills with
/// nulls. A mapping with a wider gap is kept as a mapping.
pub const MAX_INDEX_GAP: i64 = 1 << 16;

/// Replace every all-Index mapping with a list ordered by index.
///
/// Gaps are filled with nulls unless `collapse_sparseness` is set; see
/// [`MAX_INDEX_GAP`] for the limit.
pub fn listify(tree: Tree, options: ListifyOptions) -> Result<Tree> {
    match tree {
        Tree::Map(map) => listify_map(map, options),
        Tree::List(items) => items
            .into_iter()
            .map(|item| listify(item, options))
            .collect::<Result<Vec<_>>>()
            .map(Tree::List),
        other => Ok(other),
    }
}

fn listify_map(map: Mapping, options: ListifyOptions) -> Result<Tree> {
    let index_keys = map.keys().filter(|k| k.is_index()).count();

    if index_keys == 0 || index_keys < map.len() {
        if index_keys > 0 {
            let keys = map.keys().map(Key::to_string).collect::<Vec<_>>().join(", ");
            if options.strict {
                return Err(TreeError::MixedIndexKeys { keys });
            }
            debug!(keys = %keys, "Leaving mapping with mixed Index keys as a mapping");
        }
        return map
            .into_iter()
            .map(|(k, v)| Ok((k, listify(v, options)?)))
            .collect::<Result<Mapping>>()
            .map(Tree::Map);
    }

    let mut entries: Vec<(i64, Tree)> = map
        .into_iter()
        .filter_map(|(k, v)| match k {
            Key::Component(Component::Index(index)) => Some((index.get(), v)),
            _ => None,
        })
        .collect();
    entries.sort_by_key(|(index, _)| *index);

    if !options.collapse_sparseness && has_wide_gap(&entries) {
        debug!(
            len = entries.len(),
            max_gap = MAX_INDEX_GAP,
            "Leaving sparse Index mapping as a mapping"
        );
        return entries
            .into_iter()
            .map(|(index, v)| listify(v, options).map(|v| (Key::from(Component::index(index)), v)))
            .collect::<Result<Mapping>>()
            .map(Tree::Map);
    }

    let mut list = Vec::with_capacity(entries.len());
    let mut next = 0i64;
    for (index, value) in entries {
        if !options.collapse_sparseness {
            while next < index {
                list.push(Tree::null());
                next += 1;
            }
        }
        list.push(listify(value, options)?);
        next += 1;
    }
    Ok(Tree::List(list))
}

fn has_wide_gap(sorted: &[(i64, Tree)]) -> bool {
    let mut next = 0i64;
    for (index, _) in sorted {
        if index.saturating_sub(next) > MAX_INDEX_GAP {
            return true;
        }
        next = index.saturating_add(1);
    }
    false
}

/// Replace every list with a mapping from Index to element.
pub fn indexify(tree: Tree) -> Tree {
    match tree {
        Tree::List(items) => Tree::Map(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Key::from(Component::index(i as i64)), indexify(item)))
                .collect(),
        ),
        Tree::Map(map) => Tree::Map(map.into_iter().map(|(k, v)| (k, indexify(v))).collect()),
        other => other,
    }
}
