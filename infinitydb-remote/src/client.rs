//! Stateless REST client
//!
//! Every operation is one request to
//! `<server_url>/<db>/<escaped path>?action=<verb>&<params>`. A 200 status
//! means the request produced content, 204 means it produced none (for
//! reads, "not found"); anything else is a [`RemoteError::TransportFailure`].

use crate::config::AccessorConfig;
use crate::cursor::{BatchSource, Bound};
use crate::error::{RemoteError, Result};
use crate::params::{ParamValue, QueryParams};
use crate::path::escape_path;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use async_trait::async_trait;
use infinitydb_core::{parse_components, parse_lines, Component, Item};
use infinitydb_json::{
    flatten_to_tuples, from_json_slice, to_json_bytes, unflatten, TipMode, Tree,
};
use reqwest::Method;
use tracing::warn;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const INFINITYDB_CONTENT_TYPE: &str = "application/infinitydb";

/// Query parameter carrying the request tree of a query
pub const QUERY_REQUEST_PARAMETER: &str = "query-parameter";

/// Direction of a single-step move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// Nearest at or after the prefix
    First,
    Next,
    /// Nearest at or before the prefix
    Last,
    Previous,
}

impl Move {
    pub fn as_str(self) -> &'static str {
        match self {
            Move::First => "first",
            Move::Next => "next",
            Move::Last => "last",
            Move::Previous => "previous",
        }
    }
}

/// The `action` selector of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AsJson,
    AsItems,
    AsItemsBatch,
    GetBlob,
    Put,
    ExecuteQuery,
    ExecuteBlobQuery,
    Move(Move, Bound),
    Exists,
    InsertItem,
    DeleteItem,
    DeleteSubspace,
    Commit,
}

impl Action {
    pub fn verb(self) -> String {
        let verb = match self {
            Action::AsJson => "as-json",
            Action::AsItems => "as-items",
            Action::AsItemsBatch => "as-items-batch",
            Action::GetBlob => "get-blob",
            Action::Put => "put",
            Action::ExecuteQuery => "execute-query",
            Action::ExecuteBlobQuery => "execute-blob-query",
            Action::Move(direction, bound) => {
                return format!("{}-{}", direction.as_str(), bound.as_str())
            }
            Action::Exists => "exists",
            Action::InsertItem => "insert-item",
            Action::DeleteItem => "delete-item",
            Action::DeleteSubspace => "delete-subspace",
            Action::Commit => "commit",
        };
        verb.to_string()
    }
}

/// Per-call settings: the database (when not the configured default) and
/// extra query parameters laid over the configured defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    pub db: Option<String>,
    pub params: QueryParams,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_db(db: impl Into<String>) -> Self {
        Self {
            db: Some(db.into()),
            params: QueryParams::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(key, value);
        self
    }
}

/// Result of a HEAD probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadStatus {
    pub status: u16,
    pub reason: String,
}

impl HeadStatus {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Binary content with its media type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// How a query request and its response are shaped
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOptions {
    /// Expand Tuple keys in the request before sending
    pub unflatten: bool,
    /// Flatten the response into Tuple form with compacted tips
    pub flatten: bool,
    /// The query produces a blob instead of a tree
    pub blob_expected: bool,
    /// Extra tree sent as the `query-parameter` parameter
    pub request_parameter: Option<Tree>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            unflatten: true,
            flatten: true,
            blob_expected: false,
            request_parameter: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryResponse {
    Tree(Tree),
    Blob(Blob),
}

/// A successful reply: content for 200, none for 204.
struct Reply {
    content_type: Option<String>,
    body: Option<Vec<u8>>,
}

impl Reply {
    fn text(self) -> Result<Option<String>> {
        self.body
            .map(String::from_utf8)
            .transpose()
            .map_err(RemoteError::from)
    }
}

struct Command<'a> {
    method: Method,
    path: &'a [Component],
    action: Option<Action>,
    content_type: Option<&'static str>,
    body: Option<Vec<u8>>,
    params: QueryParams,
}

impl<'a> Command<'a> {
    fn new(method: Method, path: &'a [Component], action: Option<Action>) -> Self {
        Self {
            method,
            path,
            action,
            content_type: None,
            body: None,
            params: QueryParams::new(),
        }
    }

    fn content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    fn param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.set(key, value);
        self
    }
}

/// Client for one server
#[derive(Debug)]
pub struct RemoteClient<T = ReqwestTransport> {
    transport: T,
    server_url: String,
    db: Option<String>,
    default_parameters: QueryParams,
}

impl RemoteClient<ReqwestTransport> {
    /// Build a reqwest-backed client from validated configuration.
    pub fn from_config(config: &AccessorConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(transport, config.base_url(), config.db.clone())
            .with_default_parameters(config.default_query_params()))
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(transport: T, server_url: impl Into<String>, db: Option<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            server_url,
            db,
            default_parameters: QueryParams::new(),
        }
    }

    pub fn with_default_parameters(mut self, params: QueryParams) -> Self {
        self.default_parameters = params;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The default database
    pub fn db(&self) -> Option<&str> {
        self.db.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The database a call goes to: its own, else the default.
    pub fn resolve_db<'a>(&'a self, db: Option<&'a str>) -> Result<&'a str> {
        db.or(self.db.as_deref()).ok_or(RemoteError::MissingDatabase)
    }

    /// Full request URL for a path and parameter set.
    pub fn url_for(&self, db: &str, path: &[Component], params: &QueryParams) -> String {
        format!(
            "{}/{}{}{}",
            self.server_url,
            db,
            escape_path(path),
            params.to_query_string()
        )
    }

    async fn execute(&self, command: Command<'_>, options: &RequestOptions) -> Result<Reply> {
        let db = self.resolve_db(options.db.as_deref())?;

        let mut params = command
            .params
            .over(&options.params.over(&self.default_parameters));
        if let Some(action) = command.action {
            params.set("action", action.verb());
        }
        let url = self.url_for(db, command.path, &params);

        let mut request = HttpRequest::new(command.method, url);
        if let Some(content_type) = command.content_type {
            request = request.with_content_type(content_type);
        }
        if let Some(body) = command.body {
            request = request.with_body(body);
        }
        let url = request.url.clone();
        let response = self.transport.send(request).await?;

        let body = match response.body {
            Some(body) => body,
            None => return Err(RemoteError::transport(Some(400), "Null content")),
        };
        match response.status {
            200 => Ok(Reply {
                content_type: response.content_type,
                body: Some(body),
            }),
            204 => Ok(Reply {
                content_type: response.content_type,
                body: None,
            }),
            status => {
                warn!(status, url = %url, reason = %response.reason, "Request failed");
                Err(RemoteError::transport(Some(status), response.reason))
            }
        }
    }

    /// Probe connectivity to the default database. 204 is reported as 200.
    pub async fn head(&self) -> Result<HeadStatus> {
        let db = self.resolve_db(None)?;
        let url = format!("{}/{}", self.server_url, db);
        let response = self.transport.send(HttpRequest::new(Method::HEAD, url)).await?;
        let status = if response.status == 204 {
            200
        } else {
            response.status
        };
        Ok(HeadStatus {
            status,
            reason: response.reason,
        })
    }

    /// The subtree under `path` as a tree, or `None` when there is none.
    pub async fn get_json(&self, path: &[Component], options: &RequestOptions) -> Result<Option<Tree>> {
        let reply = self
            .execute(Command::new(Method::GET, path, Some(Action::AsJson)), options)
            .await?;
        reply.body.map(|b| from_json_slice(&b)).transpose().map_err(Into::into)
    }

    pub async fn get_blob(&self, path: &[Component], options: &RequestOptions) -> Result<Option<Blob>> {
        let reply = self
            .execute(Command::new(Method::GET, path, Some(Action::GetBlob)), options)
            .await?;
        let content_type = reply.content_type;
        Ok(reply.body.map(|data| Blob { content_type, data }))
    }

    /// Items under the prefix `path` (use the `limit` parameter to cap them).
    pub async fn get_items(&self, path: &[Component], options: &RequestOptions) -> Result<Option<Vec<Item>>> {
        self.items_command(path, Action::AsItems, options).await
    }

    /// Items from `start` onwards, regardless of prefix.
    pub async fn get_items_batch(&self, start: &[Component], options: &RequestOptions) -> Result<Option<Vec<Item>>> {
        self.items_command(start, Action::AsItemsBatch, options).await
    }

    async fn items_command(
        &self,
        path: &[Component],
        action: Action,
        options: &RequestOptions,
    ) -> Result<Option<Vec<Item>>> {
        let reply = self
            .execute(Command::new(Method::GET, path, Some(action)), options)
            .await?;
        match reply.text()? {
            Some(text) => Ok(Some(parse_lines(&text)?)),
            None => Ok(None),
        }
    }

    pub async fn put_blob(
        &self,
        path: &[Component],
        data: Vec<u8>,
        content_type: &'static str,
        options: &RequestOptions,
    ) -> Result<()> {
        let command = Command::new(Method::PUT, path, Some(Action::Put))
            .content_type(content_type)
            .body(data);
        self.execute(command, options).await.map(|_| ())
    }

    /// Write a tree under `path`. Compact the tips first: an empty mapping
    /// at a leaf is read by the server as nothing.
    pub async fn put_json(&self, path: &[Component], tree: &Tree, options: &RequestOptions) -> Result<()> {
        let command = Command::new(Method::PUT, path, None)
            .content_type(JSON_CONTENT_TYPE)
            .body(to_json_bytes(tree)?);
        self.execute(command, options).await.map(|_| ())
    }

    /// Post a tree; the reply is a single line of components.
    pub async fn post_json(
        &self,
        path: &[Component],
        tree: &Tree,
        options: &RequestOptions,
    ) -> Result<Option<Vec<Component>>> {
        let command = Command::new(Method::POST, path, None)
            .content_type(JSON_CONTENT_TYPE)
            .body(to_json_bytes(tree)?);
        match self.execute(command, options).await?.text()? {
            Some(text) => Ok(Some(parse_components(&text)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, path: &[Component], options: &RequestOptions) -> Result<()> {
        let command = Command::new(Method::DELETE, path, None).content_type(JSON_CONTENT_TYPE);
        self.execute(command, options).await.map(|_| ())
    }

    /// Run the query stored under `path` with `request` as its input.
    pub async fn execute_query(
        &self,
        path: &[Component],
        request: Tree,
        query: &QueryOptions,
        options: &RequestOptions,
    ) -> Result<Option<QueryResponse>> {
        let request = if query.unflatten {
            unflatten(request)?
        } else {
            request
        };
        let action = if query.blob_expected {
            Action::ExecuteBlobQuery
        } else {
            Action::ExecuteQuery
        };
        let mut command = Command::new(Method::POST, path, Some(action))
            .content_type(JSON_CONTENT_TYPE)
            .body(to_json_bytes(&request)?);
        if let Some(parameter) = &query.request_parameter {
            let parameter = unflatten(parameter.clone())?;
            let encoded = String::from_utf8(to_json_bytes(&parameter)?)?;
            command = command.param(QUERY_REQUEST_PARAMETER, encoded);
        }

        let reply = self.execute(command, options).await?;
        let content_type = reply.content_type;
        let body = match reply.body {
            Some(body) => body,
            None => return Ok(None),
        };
        if query.blob_expected {
            return Ok(Some(QueryResponse::Blob(Blob {
                content_type,
                data: body,
            })));
        }
        let tree = from_json_slice(&body)?;
        let tree = if query.flatten {
            flatten_to_tuples(tree, false, TipMode::Compact)?
        } else {
            tree
        };
        Ok(Some(QueryResponse::Tree(tree)))
    }

    /// One unbuffered step from `prefix`, or `None` when there is nowhere
    /// to go.
    pub async fn move_to(
        &self,
        direction: Move,
        bound: Bound,
        prefix: &[Component],
        options: &RequestOptions,
    ) -> Result<Option<Item>> {
        let command = Command::new(Method::GET, prefix, Some(Action::Move(direction, bound)))
            .content_type(JSON_CONTENT_TYPE);
        // a blank body names no Item
        match self.execute(command, options).await?.text()? {
            Some(text) => {
                let components = parse_components(&text)?;
                Ok((!components.is_empty()).then(|| Item::from(components)))
            }
            None => Ok(None),
        }
    }

    pub async fn first(&self, bound: Bound, prefix: &[Component], options: &RequestOptions) -> Result<Option<Item>> {
        self.move_to(Move::First, bound, prefix, options).await
    }

    pub async fn next(&self, bound: Bound, prefix: &[Component], options: &RequestOptions) -> Result<Option<Item>> {
        self.move_to(Move::Next, bound, prefix, options).await
    }

    pub async fn last(&self, bound: Bound, prefix: &[Component], options: &RequestOptions) -> Result<Option<Item>> {
        self.move_to(Move::Last, bound, prefix, options).await
    }

    pub async fn previous(&self, bound: Bound, prefix: &[Component], options: &RequestOptions) -> Result<Option<Item>> {
        self.move_to(Move::Previous, bound, prefix, options).await
    }

    pub async fn exists(&self, item: &[Component], options: &RequestOptions) -> Result<bool> {
        let command =
            Command::new(Method::GET, item, Some(Action::Exists)).content_type(JSON_CONTENT_TYPE);
        Ok(self.execute(command, options).await?.body.is_some())
    }

    pub async fn insert_item(&self, item: &[Component], options: &RequestOptions) -> Result<()> {
        self.item_command(item, Action::InsertItem, options).await
    }

    pub async fn delete_item(&self, item: &[Component], options: &RequestOptions) -> Result<()> {
        self.item_command(item, Action::DeleteItem, options).await
    }

    /// Delete every Item that has `prefix` as a prefix.
    pub async fn delete_subspace(&self, prefix: &[Component], options: &RequestOptions) -> Result<()> {
        self.item_command(prefix, Action::DeleteSubspace, options).await
    }

    async fn item_command(&self, item: &[Component], action: Action, options: &RequestOptions) -> Result<()> {
        let command = Command::new(Method::GET, item, Some(action)).content_type(JSON_CONTENT_TYPE);
        self.execute(command, options).await.map(|_| ())
    }

    /// Global commit, waiting until the data is durable.
    pub async fn commit(&self, options: &RequestOptions) -> Result<()> {
        let command = Command::new(Method::GET, &[], Some(Action::Commit))
            .content_type(INFINITYDB_CONTENT_TYPE)
            .param("wait_for_durable", true);
        self.execute(command, options).await.map(|_| ())
    }
}

#[async_trait]
impl<T: Transport> BatchSource for RemoteClient<T> {
    async fn next_bounded(&self, db: &str, item: &Item, bound: Bound) -> Result<Option<Item>> {
        self.next(bound, item, &RequestOptions::for_db(db)).await
    }

    async fn items_batch(&self, db: &str, start: &Item, limit: usize) -> Result<Vec<Item>> {
        let options = RequestOptions::for_db(db).param("limit", limit);
        Ok(self.get_items_batch(start, &options).await?.unwrap_or_default())
    }
}
