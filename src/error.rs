//! Error types for Message Bus operations.

use thiserror::Error;

/// Errors returned by the Message Bus client.
///
/// Every failed call converges on this type. Which variant you get tells you
/// how far the exchange got: [`Error::Transport`] means no response was
/// obtained at all, [`Error::Http`] means the service answered with a failure
/// status, and [`Error::Decode`] means it answered successfully with a body
/// that did not match the expected shape.
#[derive(Debug, Error)]
pub enum Error {
    /// The service responded with a non-2xx status.
    ///
    /// `message` is the `statusMessage` of a JSON error body when present,
    /// otherwise the raw body text, otherwise the HTTP status description.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// No response was obtained (DNS failure, connection refused, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response carried a body that could not be parsed.
    #[error("failed to parse response body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized; nothing was sent.
    #[error("failed to serialize request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code attached to the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::Decode { status, .. } => Some(*status),
            Error::Transport(_) | Error::Encode(_) | Error::Config(_) => None,
        }
    }

    /// Best-available human-readable message.
    pub fn message(&self) -> String {
        match self {
            Error::Http { message, .. } => message.clone(),
            Error::Transport(message) | Error::Config(message) => message.clone(),
            Error::Decode { source, .. } | Error::Encode(source) => source.to_string(),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
