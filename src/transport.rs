//! HTTP transport used by [`Client`](crate::Client).
//!
//! The client never talks to `reqwest` directly; it hands a fully built
//! [`HttpRequest`] to a [`Transport`] and interprets the [`HttpResponse`] it
//! gets back. Swap the transport to run the client without network access.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A response as read off the wire.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// `None` when the body could not be read.
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }
}

/// No response was obtained.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Performs one HTTP exchange.
///
/// Implementations return `Ok` for every response the server sent, whatever
/// its status; `Err` is reserved for exchanges that produced no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError>;
}

/// HTTP basic credentials sent with every request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// [`Transport`] backed by `reqwest`.
///
/// Proxy, credentials and TLS verification settings belong to this instance
/// only; two transports never affect each other.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    proxy: Option<String>,
    accepts_invalid_certs: bool,
}

impl ReqwestTransport {
    /// Create a transport with the given settings.
    ///
    /// `danger_accept_invalid_certs` disables certificate verification for
    /// this transport. Only use it against test servers.
    pub fn new(
        proxy: Option<&str>,
        credentials: Option<Credentials>,
        danger_accept_invalid_certs: bool,
    ) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(danger_accept_invalid_certs);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::config(format!("invalid proxy URL {proxy_url}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            credentials,
            proxy: proxy.map(str::to_string),
            accepts_invalid_certs: danger_accept_invalid_certs,
        })
    }

    /// Wrap an already configured `reqwest::Client`.
    ///
    /// Use this to set timeouts or other options the builder does not expose.
    /// The proxy and TLS settings reported by this transport are then unknown
    /// and read as unset.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self {
            http,
            credentials: None,
            proxy: None,
            accepts_invalid_certs: false,
        }
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Whether this transport skips TLS certificate verification.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accepts_invalid_certs
    }

    /// Send HTTP basic credentials with every request.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers);

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.ok();

        Ok(HttpResponse { status, body })
    }
}
