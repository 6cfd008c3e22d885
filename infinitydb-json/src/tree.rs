//! Tree - the native value space exchanged with the server
//!
//! A [`Tree`] is what the JSON body of a request or response decodes to,
//! except that mapping keys may be any component (numbers, dates, markers,
//! Index) and, in the flattened form, Tuples of components.
//!
//! [`Mapping`] keeps insertion order like a JSON object but compares as a
//! dictionary: two mappings are equal when they hold the same entries in
//! any order.

use crate::error::{Result, TreeError};
use infinitydb_core::Component;
use std::collections::HashMap;
use std::fmt;

/// A mapping key: a single component, or a Tuple of components.
#[derive(Clone, Debug, PartialEq)]
pub enum Key {
    Component(Component),
    Tuple(Vec<Component>),
}

impl Key {
    /// True for an EntityClass or Attribute key.
    pub fn is_marker(&self) -> bool {
        matches!(self, Key::Component(c) if c.is_marker())
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Key::Component(Component::Index(_)))
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Key::Component(c) => Some(c),
            Key::Tuple(_) => None,
        }
    }

    /// The key as a value, dropping a one-element Tuple to its element.
    pub fn into_tree(self) -> Tree {
        match self {
            Key::Component(c) => Tree::Scalar(c),
            Key::Tuple(mut t) if t.len() == 1 => Tree::Scalar(t.remove(0)),
            Key::Tuple(t) => Tree::Tuple(t),
        }
    }
}

impl From<Component> for Key {
    fn from(c: Component) -> Self {
        Key::Component(c)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Component(c) => write!(f, "{c}"),
            Key::Tuple(t) => {
                f.write_str("(")?;
                for (i, c) in t.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Insertion-ordered mapping with dictionary equality.
///
/// Entries live in a `Vec`; `index` maps each key's canonical form to its
/// position so lookups and inserts stay constant time on wide mappings.
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(Key, Tree)>,
    index: HashMap<String, usize>,
}

// Key holds f64 and has no Hash; its Debug form tells every variant and
// value apart.
fn canonical(key: &Key) -> String {
    format!("{key:?}")
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping holding exactly one entry.
    pub fn single(key: impl Into<Key>, value: impl Into<Tree>) -> Self {
        let mut mapping = Self::new();
        mapping.insert(key, value);
        mapping
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.index.get(&canonical(key)).copied()
    }

    fn push(&mut self, key: Key, value: Tree) {
        self.index.insert(canonical(&key), self.entries.len());
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &Key) -> Option<&Tree> {
        self.position(key).map(|pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Tree> {
        let pos = self.position(key)?;
        Some(&mut self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Tree>) -> Option<Tree> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.push(key, value);
                None
            }
        }
    }

    /// Insert, combining with an existing entry for the same key.
    ///
    /// Two mappings are merged entry by entry; a null never overwrites a
    /// mapping (the longer path already implies the shorter one). Any
    /// other collision is a replacement.
    pub fn merge(&mut self, key: impl Into<Key>, value: impl Into<Tree>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            None => self.push(key, value),
            Some(slot) => merge_into(slot, value),
        }
    }

    pub fn remove(&mut self, key: &Key) -> Option<Tree> {
        let pos = self.index.remove(&canonical(key))?;
        let (_, value) = self.entries.remove(pos);
        for later in self.index.values_mut() {
            if *later > pos {
                *later -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Tree)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Tree> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// The only entry, if there is exactly one.
    pub fn single_entry(&self) -> Option<(&Key, &Tree)> {
        match self.entries.as_slice() {
            [(k, v)] => Some((k, v)),
            _ => None,
        }
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn merge_into(slot: &mut Tree, value: Tree) {
    match (slot, value) {
        (Tree::Map(existing), Tree::Map(incoming)) => {
            for (k, v) in incoming {
                existing.merge(k, v);
            }
        }
        (Tree::Map(_), v) if v.is_null() => {}
        (slot, v) => *slot = v,
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl IntoIterator for Mapping {
    type Item = (Key, Tree);
    type IntoIter = std::vec::IntoIter<(Key, Tree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Key, Tree)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Key, Tree)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A value in the native tree space.
#[derive(Clone, Debug, PartialEq)]
pub enum Tree {
    /// Any single component, including null
    Scalar(Component),
    /// A bare Tuple, produced when a Tuple key is compacted into a value
    Tuple(Vec<Component>),
    List(Vec<Tree>),
    Map(Mapping),
}

impl Tree {
    pub fn null() -> Self {
        Tree::Scalar(Component::Null)
    }

    pub fn empty_map() -> Self {
        Tree::Map(Mapping::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Scalar(Component::Null))
    }

    pub fn is_empty_map(&self) -> bool {
        matches!(self, Tree::Map(m) if m.is_empty())
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Tree::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Component> {
        match self {
            Tree::Scalar(c) => Some(c),
            _ => None,
        }
    }

    /// Look up a component key in a mapping value.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Tree> {
        self.as_map().and_then(|m| m.get(&key.into()))
    }

    /// Use this value as a mapping key.
    ///
    /// Fails for lists and mappings, which cannot be keys.
    pub fn into_key(self) -> Result<Key> {
        match self {
            Tree::Scalar(c) => Ok(Key::Component(c)),
            Tree::Tuple(t) => Ok(Key::Tuple(t)),
            Tree::List(_) => Err(TreeError::structural("a list cannot be a mapping key")),
            Tree::Map(_) => Err(TreeError::structural("a mapping cannot be a mapping key")),
        }
    }
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Tree {
                fn from(value: $t) -> Self {
                    Tree::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_from!(Component, bool, i64, i32, f64, &str, String);

impl From<Mapping> for Tree {
    fn from(m: Mapping) -> Self {
        Tree::Map(m)
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(items: Vec<Tree>) -> Self {
        Tree::List(items)
    }
}
