//! Error types shared by the message model, the identity chain and the
//! outcome engine.

use thiserror::Error;

use crate::message::Response;

/// Boxed error produced by a transport collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building, sending or routing a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A message was created without a usable UserAgent/Session context.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// Protocol version other than "1.0" or "1.1".
    #[error("invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// Method token contains anything but ASCII letters.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// Body is neither text nor a readable stream.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Response status outside 100-599.
    #[error("invalid HTTP status: {0}")]
    InvalidStatus(u16),

    /// Rules were added after the outcome was observed.
    #[error("rules are closed; the outcome has already been observed")]
    RulesClosed,

    /// No rule accepted the response.
    #[error("unmatched response: {}", .0.status_line())]
    UnmatchedResponse(Box<Response>),

    /// The transport failed before a response was available.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Wrap any transport-side error.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(err.into())
    }

    /// The unhandled response, if this is an `UnmatchedResponse`.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::UnmatchedResponse(res) => Some(res),
            _ => None,
        }
    }

    /// Take ownership of the unhandled response, if any.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::UnmatchedResponse(res) => Some(*res),
            _ => None,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
