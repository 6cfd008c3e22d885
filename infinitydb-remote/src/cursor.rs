//! Buffered "next" over batched range reads
//!
//! The REST interface offers single-step moves (`next-item` and friends),
//! each a round trip, and batched reads (`as-items-batch`). [`NextBuffer`]
//! keeps the last batch in memory and answers successive `next` calls from
//! it, going back to the server only when the answer is not in the batch.
//!
//! Items from different component types cannot be ordered client side, so
//! lookup is by prefix equality and is linear in the batch size.

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::Result;
use async_trait::async_trait;
use infinitydb_core::Item;
use tracing::{debug, trace};

/// How much of an Item a "next" move advances past.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bound {
    /// The next whole Item
    Item,
    /// The next value of the last Tuple, truncated before the following marker
    Tuple,
    /// The next value of the last component
    Component,
}

impl Bound {
    pub fn as_str(self) -> &'static str {
        match self {
            Bound::Item => "item",
            Bound::Tuple => "tuple",
            Bound::Component => "component",
        }
    }

    /// Length of the prefix of `item` that a move under this bound keeps
    /// fixed.
    pub fn prefix_len(self, item: &Item) -> usize {
        match self {
            Bound::Item => 0,
            Bound::Component => item.len().saturating_sub(1),
            Bound::Tuple => item.last_tuple_offset(),
        }
    }

    /// Where `found` is cut when it is reported as the answer.
    pub fn end(self, found: &Item, prefix_len: usize) -> usize {
        match self {
            Bound::Item => found.len(),
            Bound::Component => (prefix_len + 1).min(found.len()),
            Bound::Tuple => found.tuple_end(prefix_len),
        }
    }

    pub fn truncate(self, found: &Item, prefix_len: usize) -> Item {
        found.truncated(self.end(found, prefix_len))
    }
}

/// Where the buffer gets its data.
#[async_trait]
pub trait BatchSource: Send + Sync {
    /// The server's own single-step move, or `None` at the end of the range.
    async fn next_bounded(&self, db: &str, item: &Item, bound: Bound) -> Result<Option<Item>>;

    /// Up to `limit` Items starting at `start`, in order.
    async fn items_batch(&self, db: &str, start: &Item, limit: usize) -> Result<Vec<Item>>;
}

enum Lookup {
    Found(Item),
    End,
    Miss,
}

/// The last batch read for one database.
#[derive(Debug, Clone)]
pub struct NextBuffer {
    items: Vec<Item>,
    db: Option<String>,
    size: usize,
    /// The batch came back short, so it runs to the end of the database
    exhausted: bool,
}

impl Default for NextBuffer {
    fn default() -> Self {
        Self::with_size(DEFAULT_BATCH_SIZE)
    }
}

impl NextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            items: Vec::new(),
            db: None,
            size: size.max(1),
            exhausted: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Batch size for later refills; the current batch is kept.
    pub fn set_size(&mut self, size: usize) {
        self.size = size.max(1);
    }

    pub fn flush(&mut self) {
        debug!(db = ?self.db, buffered = self.items.len(), "Flushing next buffer");
        self.items.clear();
        self.db = None;
        self.exhausted = false;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Database the current batch was read from.
    pub fn db(&self) -> Option<&str> {
        self.db.as_deref()
    }

    /// The next Item after `item` under `bound`, or `None` when there is
    /// none within the bound's prefix.
    pub async fn next<S: BatchSource + ?Sized>(
        &mut self,
        source: &S,
        db: &str,
        item: &Item,
        bound: Bound,
    ) -> Result<Option<Item>> {
        if self.db.as_deref() != Some(db) {
            if self.db.is_some() {
                self.flush();
            }
            self.db = Some(db.to_string());
        }

        match self.lookup(item, bound) {
            Lookup::Found(found) => {
                trace!(item = %item, found = %found, "Next buffer hit");
                return Ok(Some(found));
            }
            Lookup::End => return Ok(None),
            Lookup::Miss => {}
        }

        let answer = match source.next_bounded(db, item, bound).await? {
            Some(answer) => answer,
            None => {
                self.items.clear();
                self.exhausted = false;
                return Ok(None);
            }
        };

        let batch = source.items_batch(db, &answer, self.size).await?;
        debug!(db, size = self.size, fetched = batch.len(), "Refilled next buffer");
        self.exhausted = batch.len() < self.size;
        self.items = batch;

        let prefix_len = bound.prefix_len(item);
        let prefix = item.prefix(prefix_len);
        for entry in &self.items {
            if !entry.starts_with(prefix) {
                break;
            }
            let truncated = bound.truncate(entry, prefix_len);
            if &truncated != item {
                return Ok(Some(truncated));
            }
        }
        Ok(Some(answer))
    }

    fn lookup(&self, item: &Item, bound: Bound) -> Lookup {
        let pos = match self.items.iter().position(|entry| entry.starts_with(item)) {
            Some(pos) => pos,
            None => return Lookup::Miss,
        };

        let prefix_len = bound.prefix_len(item);
        let prefix = item.prefix(prefix_len);
        for entry in &self.items[pos..] {
            if !entry.starts_with(prefix) {
                return Lookup::End;
            }
            let truncated = bound.truncate(entry, prefix_len);
            if &truncated != item {
                return Lookup::Found(truncated);
            }
        }

        if self.exhausted {
            Lookup::End
        } else {
            Lookup::Miss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infinitydb_core::Component;
    use std::cmp::Ordering;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Sorted in-memory database
    struct MemorySource {
        items: Vec<Item>,
        calls: AtomicUsize,
    }

    impl MemorySource {
        fn new(lines: &[&str]) -> Self {
            Self {
                items: lines.iter().map(|l| l.parse().unwrap()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl BatchSource for MemorySource {
        async fn next_bounded(&self, _db: &str, item: &Item, bound: Bound) -> Result<Option<Item>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            let prefix_len = bound.prefix_len(item);
            Ok(self
                .items
                .iter()
                .filter(|e| e.starts_with(item.prefix(prefix_len)))
                .map(|e| bound.truncate(e, prefix_len))
                .find(|t| t.partial_cmp(item) == Some(Ordering::Greater)))
        }

        async fn items_batch(&self, _db: &str, start: &Item, limit: usize) -> Result<Vec<Item>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self
                .items
                .iter()
                .filter(|e| matches!((*e).partial_cmp(start), Some(Ordering::Greater | Ordering::Equal)))
                .take(limit)
                .cloned()
                .collect())
        }
    }

    fn item(text: &str) -> Item {
        text.parse().unwrap()
    }

    #[tokio::test]
    async fn test_item_bound_from_buffer() {
        let source = MemorySource::new(&["A 1", "A 2", "A 3"]);
        let mut buffer = NextBuffer::new();

        // the first call reads the whole database into the buffer
        let first = buffer.next(&source, "db", &item("A"), Bound::Item).await.unwrap();
        assert_eq!(first, Some(item("A 1")));
        assert_eq!(buffer.len(), 3);
        assert_eq!(source.calls(), 2);

        let next = buffer.next(&source, "db", &item("A 1"), Bound::Item).await.unwrap();
        assert_eq!(next, Some(item("A 2")));
        let last = buffer.next(&source, "db", &item("A 3"), Bound::Item).await.unwrap();
        assert_eq!(last, None);

        // both answered from the buffer
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_full_batch_is_not_the_end() {
        let source = MemorySource::new(&["A 1", "A 2", "A 3", "A 4"]);
        let mut buffer = NextBuffer::with_size(2);

        assert_eq!(
            buffer.next(&source, "db", &item("A 1"), Bound::Item).await.unwrap(),
            Some(item("A 2"))
        );
        // buffer holds A 2, A 3 and is full, so running off its end re-reads
        assert_eq!(
            buffer.next(&source, "db", &item("A 3"), Bound::Item).await.unwrap(),
            Some(item("A 4"))
        );
        assert_eq!(source.calls(), 4);
        assert_eq!(
            buffer.next(&source, "db", &item("A 4"), Bound::Item).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_tuple_bound() {
        let source = MemorySource::new(&[
            "Gene \"g1\" end 2",
            "Gene \"g1\" start 1",
            "Gene \"g2\" start 3",
        ]);
        let mut buffer = NextBuffer::new();
        buffer.next(&source, "db", &item("Gene"), Bound::Item).await.unwrap();

        assert_eq!(
            buffer.next(&source, "db", &item("Gene \"g1\""), Bound::Tuple).await.unwrap(),
            Some(item("Gene \"g2\""))
        );
        assert_eq!(
            buffer.next(&source, "db", &item("Gene \"g2\""), Bound::Tuple).await.unwrap(),
            None
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_component_bound_stops_at_prefix_end() {
        let source = MemorySource::new(&[
            "Gene \"g1\" end 2",
            "Gene \"g1\" start 1",
            "Gene \"g2\" start 3",
        ]);
        let mut buffer = NextBuffer::new();
        buffer.next(&source, "db", &item("Gene"), Bound::Item).await.unwrap();

        assert_eq!(
            buffer
                .next(&source, "db", &item("Gene \"g1\" end"), Bound::Component)
                .await
                .unwrap(),
            Some(item("Gene \"g1\" start"))
        );
        assert_eq!(
            buffer
                .next(&source, "db", &item("Gene \"g1\" start"), Bound::Component)
                .await
                .unwrap(),
            None
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_miss_goes_to_source() {
        let source = MemorySource::new(&["A 1", "A 2", "B 1"]);
        let mut buffer = NextBuffer::new();

        assert_eq!(
            buffer.next(&source, "db", &item("A 2"), Bound::Item).await.unwrap(),
            Some(item("B 1"))
        );
        assert_eq!(source.calls(), 2);
        assert_eq!(
            buffer.next(&source, "db", &item("B 1"), Bound::Item).await.unwrap(),
            None
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_source_end_clears_buffer() {
        let source = MemorySource::new(&["A 1"]);
        let mut buffer = NextBuffer::new();
        assert_eq!(
            buffer.next(&source, "db", &item("A 1"), Bound::Item).await.unwrap(),
            None
        );
        assert!(buffer.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_database_change_flushes() {
        let source = MemorySource::new(&["A 1", "A 2"]);
        let mut buffer = NextBuffer::new();
        buffer.next(&source, "one", &item("A"), Bound::Item).await.unwrap();
        assert_eq!(buffer.db(), Some("one"));
        assert_eq!(source.calls(), 2);

        buffer.next(&source, "two", &item("A 1"), Bound::Item).await.unwrap();
        assert_eq!(buffer.db(), Some("two"));
        assert_eq!(source.calls(), 4);
    }

    #[test]
    fn test_bound_offsets() {
        let gene = item("Gene \"g1\" start 100");
        assert_eq!(Bound::Item.prefix_len(&gene), 0);
        assert_eq!(Bound::Component.prefix_len(&gene), 3);
        assert_eq!(Bound::Tuple.prefix_len(&gene), 3);
        assert_eq!(Bound::Component.prefix_len(&Item::new()), 0);

        let found = item("Gene \"g2\" end 5");
        assert_eq!(Bound::Tuple.truncate(&found, 1), item("Gene \"g2\""));
        assert_eq!(Bound::Component.truncate(&found, 1), item("Gene \"g2\""));
        assert_eq!(Bound::Item.truncate(&found, 0), found);
        assert_eq!(
            Bound::Component.truncate(&found, 4).components(),
            &[
                Component::entity_class("Gene").unwrap(),
                Component::from("g2"),
                Component::attribute("end").unwrap(),
                Component::Int(5)
            ]
        );
    }

    #[test]
    fn test_set_size_and_flush() {
        let mut buffer = NextBuffer::new();
        assert_eq!(buffer.size(), DEFAULT_BATCH_SIZE);
        buffer.set_size(0);
        assert_eq!(buffer.size(), 1);
        buffer.flush();
        assert!(buffer.is_empty());
        assert_eq!(buffer.db(), None);
    }
}
