//! Message model subsystem.
//!
//! # Data Flow
//! ```text
//! Request::send()
//!     → request.rs (snapshot, date header, merged headers)
//!     → transport (external collaborator)
//!     → response.rs (Response bound to the snapshot)
//!     → outcome (rule dispatch)
//! ```
//!
//! # Design Decisions
//! - `Message` is embedded by `Request` and `Response`, never subclassed;
//!   the shared surface is the `HttpMessage` trait
//! - Validation happens at assignment and fails synchronously

pub mod request;
pub mod response;
pub mod uri;

pub use request::{Request, RequestBuilder, RequestOptions};
pub use response::{Response, ResponseOptions};
pub use uri::RequestUri;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Error, Result};
use crate::headers::HeaderCollection;
use crate::identity::{Session, UserAgent};

/// HTTP protocol version of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Version {
    #[serde(rename = "1.0")]
    Http10,
    #[default]
    #[serde(rename = "1.1")]
    Http11,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "1.0",
            Version::Http11 => "1.1",
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.0" => Ok(Version::Http10),
            "1.1" => Ok(Version::Http11),
            other => Err(Error::InvalidVersion(other.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ByteStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// One-shot readable stream used as a request body.
///
/// Clones share the stream; whichever transport takes it first consumes it.
#[derive(Clone)]
pub struct BodyStream(Arc<Mutex<Option<ByteStream>>>);

impl BodyStream {
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let stream = stream.map_err(|e: E| -> BoxError { e.into() }).boxed();
        Self(Arc::new(Mutex::new(Some(stream))))
    }

    /// Take the stream out; `None` once it has been taken.
    pub fn take(&self) -> Option<ByteStream> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_consumed(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Message body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Text body; the only buffered form accepted for outgoing requests.
    Text(String),
    /// Raw bytes as received from the transport, undecoded.
    Bytes(Bytes),
    /// Streaming request body.
    Stream(BodyStream),
}

impl Body {
    /// Body as text, if it is buffered and valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            Body::Stream(_) => None,
        }
    }

    /// Buffered body bytes; `None` for streams.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Text(text) => Some(text.as_bytes()),
            Body::Bytes(bytes) => Some(bytes),
            Body::Stream(_) => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Text(String::new())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<BodyStream> for Body {
    fn from(stream: BodyStream) -> Self {
        Body::Stream(stream)
    }
}

/// Where a new message attaches to the identity chain.
#[derive(Debug, Clone)]
pub enum Context {
    /// A fresh session is synthesized beneath this agent.
    UserAgent(UserAgent),
    /// The session is reused and its agent read from it.
    Session(Session),
}

impl Context {
    pub(crate) fn into_session(self) -> Session {
        match self {
            Context::UserAgent(ua) => ua.create_session(),
            Context::Session(session) => session,
        }
    }
}

impl From<UserAgent> for Context {
    fn from(ua: UserAgent) -> Self {
        Context::UserAgent(ua)
    }
}

impl From<&UserAgent> for Context {
    fn from(ua: &UserAgent) -> Self {
        Context::UserAgent(ua.clone())
    }
}

impl From<Session> for Context {
    fn from(session: Session) -> Self {
        Context::Session(session)
    }
}

impl From<&Session> for Context {
    fn from(session: &Session) -> Self {
        Context::Session(session.clone())
    }
}

/// State shared by requests and responses.
#[derive(Debug, Clone)]
pub struct Message {
    version: Version,
    headers: HeaderCollection,
    body: Body,
    session: Session,
}

impl Message {
    pub(crate) fn new(context: Context) -> Self {
        let session = context.into_session();
        Self {
            version: session.user_agent().default_version(),
            headers: HeaderCollection::new(),
            body: Body::default(),
            session,
        }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }
}

/// Capability surface of `Request` and `Response`.
pub trait HttpMessage {
    fn message(&self) -> &Message;

    fn message_mut(&mut self) -> &mut Message;

    fn version(&self) -> Version {
        self.message().version
    }

    /// Set the protocol version; only "1.0" and "1.1" are accepted.
    fn set_version(&mut self, version: &str) -> Result<()> {
        self.message_mut().version = version.parse()?;
        Ok(())
    }

    /// Own headers of this message (no merge).
    fn message_headers(&self) -> &HeaderCollection {
        &self.message().headers
    }

    fn body(&self) -> &Body {
        &self.message().body
    }

    fn set_body(&mut self, body: impl Into<String>) {
        self.message_mut().body = Body::Text(body.into());
    }

    /// Set the body from bytes; they must be valid UTF-8 text.
    fn set_body_bytes(&mut self, body: impl Into<Bytes>) -> Result<()> {
        let bytes = body.into();
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::InvalidBody(format!("body is not text: {}", e)))?;
        self.message_mut().body = Body::Text(text);
        Ok(())
    }

    fn set_body_stream(&mut self, stream: BodyStream) {
        self.message_mut().body = Body::Stream(stream);
    }

    fn session(&self) -> &Session {
        &self.message().session
    }

    fn user_agent(&self) -> &UserAgent {
        self.message().session.user_agent()
    }
}
