//! Inbound response bound to the request snapshot that produced it.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::error::{Error, Result};
use crate::headers::{HeaderBearer, HeaderCollection};
use crate::message::{Body, Context, HttpMessage, Message, Request, Version};
use crate::transport::TransportResponse;

/// Everything a response is built from.
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    pub version: Version,
    pub status: u16,
    pub headers: HeaderCollection,
    pub body: Body,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            version: Version::Http11,
            status: 200,
            headers: HeaderCollection::new(),
            body: Body::default(),
        }
    }
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    request: Arc<Request>,
    status: u16,
}

fn validate_status(status: u16) -> Result<()> {
    if (100..=599).contains(&status) {
        Ok(())
    } else {
        Err(Error::InvalidStatus(status))
    }
}

impl Response {
    /// Create a response for `request`, sharing its session.
    pub fn new(request: Arc<Request>, options: ResponseOptions) -> Result<Self> {
        validate_status(options.status)?;

        let mut message = Message::new(Context::Session(request.session().clone()));
        message.version = options.version;
        message.headers = options.headers;
        message.body = options.body;

        Ok(Self {
            message,
            request,
            status: options.status,
        })
    }

    pub(crate) fn from_transport(request: Arc<Request>, reply: TransportResponse) -> Result<Self> {
        let TransportResponse {
            version,
            status,
            headers,
            body,
        } = reply;

        Self::new(
            request,
            ResponseOptions {
                version,
                status,
                headers,
                body: Body::Bytes(body),
            },
        )
    }

    /// The request snapshot this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status; fails outside 100-599.
    pub fn set_status(&mut self, status: u16) -> Result<()> {
        validate_status(status)?;
        self.status = status;
        Ok(())
    }

    /// Standard reason phrase for the status, if one exists.
    pub fn reason(&self) -> Option<&'static str> {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
    }

    /// e.g. `HTTP/1.1 404 Not Found`.
    pub fn status_line(&self) -> String {
        match self.reason() {
            Some(reason) => format!("HTTP/{} {} {}", self.message.version, self.status, reason),
            None => format!("HTTP/{} {}", self.message.version, self.status),
        }
    }

    /// Body as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        self.message.body.as_str()
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl HeaderBearer for Response {
    fn headers(&self) -> HeaderCollection {
        self.message.headers.clone()
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.message.headers.set(name, value);
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.message.headers.add(name, value);
    }
}
