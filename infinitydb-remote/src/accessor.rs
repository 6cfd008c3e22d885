//! Client plus next buffer
//!
//! [`Accessor`] is the usual entry point: it owns a [`RemoteClient`] for
//! one server and a [`NextBuffer`] that turns runs of `next` calls into
//! batched reads. Reads are reachable through `Deref`; writes go through
//! the accessor so they can flush the buffer.

use crate::client::{QueryOptions, QueryResponse, RemoteClient, RequestOptions};
use crate::config::AccessorConfig;
use crate::cursor::{Bound, NextBuffer};
use crate::error::Result;
use crate::transport::{ReqwestTransport, Transport};
use infinitydb_core::{Component, Item};
use infinitydb_json::Tree;
use std::ops::Deref;
use tracing::info;

#[derive(Debug)]
pub struct Accessor<T = ReqwestTransport> {
    client: RemoteClient<T>,
    next_buffer: NextBuffer,
}

impl Accessor<ReqwestTransport> {
    pub fn from_config(config: &AccessorConfig) -> Result<Self> {
        let client = RemoteClient::from_config(config)?;
        info!(
            server_url = %client.server_url(),
            db = ?client.db(),
            batch_size = config.batch_size,
            "Created InfinityDB accessor"
        );
        Ok(Self {
            client,
            next_buffer: NextBuffer::with_size(config.batch_size),
        })
    }
}

impl<T: Transport> Accessor<T> {
    pub fn new(client: RemoteClient<T>) -> Self {
        Self {
            client,
            next_buffer: NextBuffer::new(),
        }
    }

    pub fn client(&self) -> &RemoteClient<T> {
        &self.client
    }

    pub fn next_buffer(&self) -> &NextBuffer {
        &self.next_buffer
    }

    /// Optionally drop the current batch, then set the size of later
    /// refills.
    pub fn set_next_buffer(&mut self, flush: bool, size: usize) {
        if flush {
            self.next_buffer.flush();
        }
        self.next_buffer.set_size(size);
    }

    /// Buffered `next` under any bound, in `db` or the default database.
    pub async fn buffered_next(&mut self, db: Option<&str>, item: &Item, bound: Bound) -> Result<Option<Item>> {
        let db = self.client.resolve_db(db)?.to_string();
        self.next_buffer.next(&self.client, &db, item, bound).await
    }

    pub async fn next_item(&mut self, item: &Item) -> Result<Option<Item>> {
        self.buffered_next(None, item, Bound::Item).await
    }

    pub async fn next_tuple(&mut self, item: &Item) -> Result<Option<Item>> {
        self.buffered_next(None, item, Bound::Tuple).await
    }

    pub async fn next_component(&mut self, item: &Item) -> Result<Option<Item>> {
        self.buffered_next(None, item, Bound::Component).await
    }

    // Writes shadow the client's and flush the next buffer even on failure:
    // a failed request may still have changed the data.

    fn flushed<R>(&mut self, result: Result<R>) -> Result<R> {
        self.next_buffer.flush();
        result
    }

    pub async fn insert_item(&mut self, item: &Item, options: &RequestOptions) -> Result<()> {
        let result = self.client.insert_item(item, options).await;
        self.flushed(result)
    }

    pub async fn delete_item(&mut self, item: &Item, options: &RequestOptions) -> Result<()> {
        let result = self.client.delete_item(item, options).await;
        self.flushed(result)
    }

    pub async fn delete_subspace(&mut self, prefix: &Item, options: &RequestOptions) -> Result<()> {
        let result = self.client.delete_subspace(prefix, options).await;
        self.flushed(result)
    }

    pub async fn put_json(&mut self, path: &[Component], tree: &Tree, options: &RequestOptions) -> Result<()> {
        let result = self.client.put_json(path, tree, options).await;
        self.flushed(result)
    }

    pub async fn post_json(
        &mut self,
        path: &[Component],
        tree: &Tree,
        options: &RequestOptions,
    ) -> Result<Option<Vec<Component>>> {
        let result = self.client.post_json(path, tree, options).await;
        self.flushed(result)
    }

    pub async fn put_blob(
        &mut self,
        path: &[Component],
        data: Vec<u8>,
        content_type: &'static str,
        options: &RequestOptions,
    ) -> Result<()> {
        let result = self.client.put_blob(path, data, content_type, options).await;
        self.flushed(result)
    }

    pub async fn delete(&mut self, path: &[Component], options: &RequestOptions) -> Result<()> {
        let result = self.client.delete(path, options).await;
        self.flushed(result)
    }

    /// Queries may write, so they flush like any other write.
    pub async fn execute_query(
        &mut self,
        path: &[Component],
        request: Tree,
        query: &QueryOptions,
        options: &RequestOptions,
    ) -> Result<Option<QueryResponse>> {
        let result = self.client.execute_query(path, request, query, options).await;
        self.flushed(result)
    }

    pub async fn commit(&mut self, options: &RequestOptions) -> Result<()> {
        let result = self.client.commit(options).await;
        self.flushed(result)
    }
}

impl<T> Deref for Accessor<T> {
    type Target = RemoteClient<T>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
