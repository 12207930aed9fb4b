//! Message Bus async client implementation.

use crate::models::{
    BatchEmailResponse, BatchEmailSendRequest, BatchTemplateSendRequest, DeliveryErrorsResponse,
    ErrorResponse, MailingListCreateRequest, MailingListCreateResponse,
    MailingListEntryCreateRequest, MailingListEntryCreateResponse,
    MailingListEntryDeleteResponse, MailingListsResponse, StatsResponse, UnsubscribesResponse,
};
use crate::transport::{Credentials, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::{Error, Result};
use chrono::NaiveDate;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.messagebus.com";
const DEFAULT_API_PATH: &str = "api/v3";
const USER_AGENT_VALUE: &str = concat!("MessageBusAPI:", env!("CARGO_PKG_VERSION"), "-RUST");
const API_KEY_HEADER: &str = "X-MessageBus-Key";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const DATE_FORMAT: &str = "%Y-%m-%d";

const SEND_EMAILS: &str = "emails/send";
const SEND_TEMPLATES: &str = "templates/send";
const STATS: &str = "stats";
const DELIVERY_ERRORS: &str = "delivery_errors";
const UNSUBSCRIBES: &str = "unsubscribes";
const MAILING_LISTS: &str = "mailing_lists";

const ENV_API_KEY: &str = "MESSAGEBUS_API_KEY";
const ENV_BASE_URL: &str = "MESSAGEBUS_BASE_URL";
const ENV_API_PATH: &str = "MESSAGEBUS_API_PATH";

/// Async client for the Message Bus email delivery service.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings
/// like a proxy, credentials, or a different base URL. The client is generic
/// over its [`Transport`] so it can run against a fake in tests.
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
    api_key: HeaderValue,
    base_url: String,
    api_path: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for `api_key` with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use messagebus_client::Client;
    /// # fn main() -> Result<(), messagebus_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Create a client from the environment.
    ///
    /// Reads `MESSAGEBUS_API_KEY` (required), and `MESSAGEBUS_BASE_URL` and
    /// `MESSAGEBUS_API_PATH` when set.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env()?.build()
    }
}

impl<T: Transport> Client<T> {
    /// Send a batch of emails.
    ///
    /// # Examples
    /// ```no_run
    /// # use messagebus_client::{BatchEmailSendRequest, Client, EmailMessage};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), messagebus_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// let message = EmailMessage {
    ///     to_email: "bob@example.com".into(),
    ///     from_email: "alice@example.com".into(),
    ///     subject: "Hello".into(),
    ///     plaintext_body: Some("Hi Bob".into()),
    ///     ..Default::default()
    /// };
    /// let response = client.send_emails(&BatchEmailSendRequest::new(vec![message])).await?;
    /// println!("{} sent", response.success_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_emails(&self, request: &BatchEmailSendRequest) -> Result<BatchEmailResponse> {
        self.post(self.url(SEND_EMAILS), request).await
    }

    /// Send a batch of emails rendered from a stored template.
    pub async fn send_templates(
        &self,
        request: &BatchTemplateSendRequest,
    ) -> Result<BatchEmailResponse> {
        self.post(self.url(SEND_TEMPLATES), request).await
    }

    /// Retrieve delivery statistics, optionally filtered by date range and tag.
    ///
    /// # Examples
    /// ```no_run
    /// # use chrono::NaiveDate;
    /// # use messagebus_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), messagebus_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// let start = NaiveDate::from_ymd_opt(2012, 1, 1);
    /// let stats = client.retrieve_stats(start, None, Some("promo")).await?;
    /// println!("{}", stats.stats.msgs_attempted_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn retrieve_stats(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        tag: Option<&str>,
    ) -> Result<StatsResponse> {
        let url = with_query(
            self.url(STATS),
            &[
                ("startDate", start_date.map(format_date)),
                ("endDate", end_date.map(format_date)),
                ("tag", tag.map(str::to_string)),
            ],
        );
        self.get(url).await
    }

    /// Retrieve delivery errors, optionally filtered by date range.
    pub async fn retrieve_delivery_errors(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<DeliveryErrorsResponse> {
        let url = with_query(self.url(DELIVERY_ERRORS), &date_range(start_date, end_date));
        self.get(url).await
    }

    /// Retrieve unsubscribe events, optionally filtered by date range.
    pub async fn retrieve_unsubscribes(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<UnsubscribesResponse> {
        let url = with_query(self.url(UNSUBSCRIBES), &date_range(start_date, end_date));
        self.get(url).await
    }

    /// Create a mailing list. The returned key addresses it in later calls.
    pub async fn create_mailing_list(
        &self,
        request: &MailingListCreateRequest,
    ) -> Result<MailingListCreateResponse> {
        self.post(self.url(MAILING_LISTS), request).await
    }

    /// List the account's mailing lists.
    pub async fn list_mailing_lists(&self) -> Result<MailingListsResponse> {
        self.get(self.url(MAILING_LISTS)).await
    }

    /// Add an entry to the mailing list identified by `mailing_list_key`.
    pub async fn create_mailing_list_entry(
        &self,
        mailing_list_key: &str,
        request: &MailingListEntryCreateRequest,
    ) -> Result<MailingListEntryCreateResponse> {
        let url = self.url(&format!("mailing_list/{mailing_list_key}/entries"));
        self.post(url, request).await
    }

    /// Remove `email` from the mailing list identified by `mailing_list_key`.
    pub async fn delete_mailing_list_entry(
        &self,
        mailing_list_key: &str,
        email: &str,
    ) -> Result<MailingListEntryDeleteResponse> {
        let url = self.url(&format!("mailing_list/{mailing_list_key}/entry/{email}"));
        self.execute(Method::DELETE, url, None).await
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get<R: DeserializeOwned>(&self, url: String) -> Result<R> {
        self.execute(Method::GET, url, None).await
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: String, body: &B) -> Result<R> {
        let body = serde_json::to_vec(body).map_err(|source| {
            error!(%url, "Message Bus request body could not be serialized: {source}");
            Error::Encode(source)
        })?;
        self.execute(Method::POST, url, Some(body)).await
    }

    /// Common request pattern: send, then map the response or failure.
    async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
    ) -> Result<R> {
        debug!(%method, %url, "sending Message Bus request");

        let request = HttpRequest {
            headers: self.headers(body.is_some()),
            method,
            url,
            body,
        };

        let response = self.transport.execute(request).await.map_err(|e| {
            error!(status_text = "<unknown>", "Message Bus request failed: {e}");
            Error::Transport(e.message)
        })?;

        Self::handle_response(response)
    }

    fn handle_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R> {
        let status = response.status;
        if !status.is_success() {
            return Err(Self::handle_failure(response));
        }

        // A body-less success (e.g. 204 on delete) maps to the default response.
        let body = response
            .body
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| "{}".to_string());
        serde_json::from_str(&body).map_err(|source| {
            error!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or("<unknown>"),
                "Message Bus response could not be parsed: {source}"
            );
            Error::Decode {
                status: status.as_u16(),
                source,
            }
        })
    }

    /// Pick the best available message for a failure status.
    fn handle_failure(response: HttpResponse) -> Error {
        let status = response.status;
        let status_text = status.canonical_reason().unwrap_or("<unknown>");

        let message = match response.body.filter(|body| !body.trim().is_empty()) {
            Some(body) => match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) if !parsed.status_message.trim().is_empty() => parsed.status_message,
                _ => body,
            },
            None => status_text.to_string(),
        };

        error!(
            status = status.as_u16(),
            status_text,
            "Message Bus request failed: {message}"
        );

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_path, endpoint)
    }

    /// Build headers for API requests.
    fn headers(&self, has_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        headers
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> [(&'static str, Option<String>); 2] {
    [
        ("startDate", start_date.map(format_date)),
        ("endDate", end_date.map(format_date)),
    ]
}

/// Append the present parameters as a query string.
fn with_query(mut url: String, params: &[(&str, Option<String>)]) -> String {
    let query = params
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| format!("{key}={value}")))
        .collect::<Vec<_>>()
        .join("&");

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Builder for configuring a Message Bus client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    api_path: String,
    proxy: Option<String>,
    credentials: Option<Credentials>,
    danger_accept_invalid_certs: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Base URL `https://api.messagebus.com`
    /// - API path `api/v3`
    /// - No proxy and no credentials
    /// - `danger_accept_invalid_certs = false`
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            proxy: None,
            credentials: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Create a builder from `MESSAGEBUS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| Error::config(format!("{ENV_API_KEY} environment variable not set")))?;

        let mut builder = Self::new().api_key(api_key);
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            builder = builder.base_url(base_url);
        }
        if let Ok(api_path) = std::env::var(ENV_API_PATH) {
            builder = builder.api_path(api_path);
        }
        Ok(builder)
    }

    /// Set the API key sent in the `X-MessageBus-Key` header. Required.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the service domain (e.g. `https://api.messagebus.com`).
    ///
    /// Useful for testing against a local server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the API path prefix (default `api/v3`).
    pub fn api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Send HTTP basic credentials with every request.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    ///
    /// Applies to this client's transport only. Leave it off outside tests.
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Build a client backed by [`ReqwestTransport`].
    ///
    /// # Examples
    /// ```no_run
    /// # use messagebus_client::Client;
    /// # fn main() -> Result<(), messagebus_client::Error> {
    /// let client = Client::builder()
    ///     .api_key("my-api-key")
    ///     .proxy("http://127.0.0.1:8080")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let transport = ReqwestTransport::new(
            self.proxy.as_deref(),
            self.credentials.clone(),
            self.danger_accept_invalid_certs,
        )?;
        self.build_with_transport(transport)
    }

    /// Build a client that sends requests through `transport`.
    ///
    /// Proxy, credential and TLS settings on the builder are ignored; the
    /// transport owns those concerns.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let api_key = self
            .api_key
            .ok_or_else(|| Error::config("API key is required"))?;
        let mut api_key = HeaderValue::from_str(&api_key)
            .map_err(|_| Error::config("API key contains characters not allowed in a header"))?;
        api_key.set_sensitive(true);

        Ok(Client {
            transport,
            api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_path: self.api_path.trim_matches('/').to_string(),
        })
    }
}
