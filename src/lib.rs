//! # Message Bus Client
//! Asynchronous wrapper around the Message Bus email delivery HTTP API (v3), providing typed methods to send email batches, read delivery statistics, and manage mailing lists from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust services that send transactional or bulk email through Message Bus: configure with [`ClientBuilder`] (or [`Client::from_env`]), build a request model such as [`BatchEmailSendRequest`], and read the typed response ([`BatchEmailResponse`]).
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest` through the [`Transport`] trait, which can be replaced to run the client without network access.
//!
//! ## Out of scope
//! No retries, rate limiting, or streaming. Every call performs exactly one HTTP exchange and either returns the parsed response or an error. Timeouts are whatever the underlying `reqwest::Client` uses; pass your own through [`ReqwestTransport::from_client`] to change them.
//!
//! ## Errors
//! Every failure is an [`Error`]. A non-2xx response becomes [`Error::Http`] with the status code and the best message available (the service's `statusMessage`, else the raw body, else the status description). A request that got no response becomes [`Error::Transport`]. Each error is logged with `tracing` before it is returned.
//!
//! ## Example
//! ```no_run
//! use messagebus_client::{BatchEmailSendRequest, Client, EmailMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), messagebus_client::Error> {
//!     let client = Client::new("my-api-key")?;
//!
//!     let message = EmailMessage {
//!         to_email: "bob@example.com".into(),
//!         from_email: "alice@example.com".into(),
//!         subject: "Welcome".into(),
//!         html_body: Some("<p>Hello Bob</p>".into()),
//!         ..Default::default()
//!     };
//!     let response = client.send_emails(&BatchEmailSendRequest::new(vec![message])).await?;
//!     for result in response.results {
//!         println!("{} -> {}", result.to_email, result.message_id);
//!     }
//!
//!     let lists = client.list_mailing_lists().await?;
//!     for list in lists.mailing_lists {
//!         println!("{}: {}", list.key, list.name);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod transport;

pub use client::{Client, ClientBuilder};
pub use error::Error;
pub use models::{
    ApiStatus, BatchEmailResponse, BatchEmailResult, BatchEmailSendRequest,
    BatchTemplateSendRequest, DeliveryError, DeliveryErrorsResponse, EMAIL_MERGE_FIELD,
    EmailMessage, ErrorResponse, FilterStats, MailingList, MailingListCreateRequest,
    MailingListCreateResponse, MailingListEntryCreateRequest, MailingListEntryCreateResponse,
    MailingListEntryDeleteResponse, MailingListsResponse, MessageStats, SmtpStats,
    StatsResponse, TemplateMessage, Unsubscribe, UnsubscribesResponse,
};
pub use transport::{
    Credentials, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError,
};

/// Result type alias for Message Bus operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
