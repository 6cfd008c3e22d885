//! HTTP transport
//!
//! The accessor only needs "send a request, get a status and a body back".
//! [`Transport`] is that seam; [`ReqwestTransport`] is the real
//! implementation with HTTP basic authentication.

use crate::config::AccessorConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// An outgoing request, fully resolved
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            body: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// What came back. `body` is `None` only when the transport could not
/// produce one at all.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

#[async_trait]
pub trait Transport: Debug + Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    user: Option<String>,
    password: Option<String>,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client, user: Option<String>, password: Option<String>) -> Self {
        Self {
            http,
            user,
            password,
        }
    }

    /// Build the HTTP client from the TLS, timeout and credential settings.
    pub fn from_config(config: &AccessorConfig) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::new(
            builder.build()?,
            config.user.clone(),
            config.password.clone(),
        ))
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref user) = self.user {
            req.basic_auth(user, self.password.as_ref())
        } else {
            req
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut req = self.add_auth(self.http.request(request.method, &request.url));
        if let Some(content_type) = request.content_type {
            req = req.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body: Some(body.to_vec()),
        })
    }
}
