//! Error types for the request helper.
//!
//! # Design
//! Only the HTTP status failure gets a message of its own. Transport, JSON
//! and multipart failures wrap the underlying error transparently so callers
//! see it unchanged. `Cancelled` is a dedicated variant so the stream adapter
//! can tell a caller-initiated abort apart from every other failure.

use thiserror::Error;

/// Errors returned by `RequestExecutor` calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status outside 200–299. The body is not
    /// read.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// The request could not complete, or the response body could not be
    /// read or parsed as JSON.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A payload could not be serialized, or a JSON body did not match the
    /// requested type.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A `multipart/form-data` body was malformed.
    #[error(transparent)]
    Multipart(#[from] multer::Error),

    /// The decoded body is not the shape the caller asked for.
    #[error("expected {expected} body, got {actual}")]
    UnexpectedBody {
        expected: &'static str,
        actual: &'static str,
    },

    /// The caller aborted the request before a response arrived.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Status code of an HTTP status failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status } => Some(*status),
            _ => None,
        }
    }
}
