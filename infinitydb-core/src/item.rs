//! Item - the full key of one database record
//!
//! An Item is a sequence of components. The EntityClass and Attribute
//! components it contains split it into Tuple segments: an Item with `n`
//! markers has `n + 1` tuples, the first of which precedes any marker and
//! is usually empty.
//!
//! ```
//! use infinitydb_core::{Component, Item, Segment};
//!
//! let item: Item = "Gene \"g1\" start 100".parse().unwrap();
//! let segments = item.segments();
//! assert_eq!(segments.len(), 5);
//! assert_eq!(segments[0], Segment::Tuple(vec![]));
//! assert_eq!(segments[4], Segment::Tuple(vec![Component::Int(100)]));
//! ```

use crate::component::Component;
use crate::error::CoreError;
use crate::token::parse_components;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// One piece of an Item split at its markers.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// A run of non-marker components (possibly empty)
    Tuple(Vec<Component>),
    /// An EntityClass or Attribute
    Marker(Component),
}

/// An ordered sequence of components.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item(Vec<Component>);

impl Item {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, component: impl Into<Component>) {
        self.0.push(component.into());
    }

    pub fn components(&self) -> &[Component] {
        &self.0
    }

    pub fn into_components(self) -> Vec<Component> {
        self.0
    }

    /// Split into alternating tuples and markers, always starting and
    /// ending with a tuple.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut tuple = Vec::new();
        for component in &self.0 {
            if component.is_marker() {
                segments.push(Segment::Tuple(std::mem::take(&mut tuple)));
                segments.push(Segment::Marker(component.clone()));
            } else {
                tuple.push(component.clone());
            }
        }
        segments.push(Segment::Tuple(tuple));
        segments
    }

    /// Offset where the last tuple starts: just after the last marker, or 0.
    pub fn last_tuple_offset(&self) -> usize {
        self.0
            .iter()
            .rposition(Component::is_marker)
            .map_or(0, |pos| pos + 1)
    }

    /// Offset of the first marker at or after `from`, or the length.
    pub fn tuple_end(&self, from: usize) -> usize {
        self.0
            .iter()
            .skip(from)
            .position(Component::is_marker)
            .map_or(self.0.len(), |pos| from + pos)
    }

    /// The first `len` components (all of them if shorter).
    pub fn prefix(&self, len: usize) -> &[Component] {
        &self.0[..len.min(self.0.len())]
    }

    /// A copy of the first `len` components.
    pub fn truncated(&self, len: usize) -> Item {
        Item(self.prefix(len).to_vec())
    }

    pub fn starts_with(&self, prefix: &[Component]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Deref for Item {
    type Target = [Component];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Component>> for Item {
    fn from(components: Vec<Component>) -> Self {
        Self(components)
    }
}

impl FromIterator<Component> for Item {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Item {
    type Item = Component;
    type IntoIter = std::vec::IntoIter<Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Lexicographic by component; `None` as soon as two components at the
/// same position have different types.
impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.partial_cmp(b)? {
                Ordering::Equal => continue,
                ord => return Some(ord),
            }
        }
        Some(self.0.len().cmp(&other.0.len()))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Item {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_components(s).map(Item)
    }
}
