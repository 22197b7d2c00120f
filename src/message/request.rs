//! Outbound request.
//!
//! # Responsibilities
//! - Validate method tokens and hold the canonical URI
//! - Merge the request tier over its session and agent tiers
//! - Snapshot itself on send so later mutation cannot reach the wire
//!
//! # Design Decisions
//! - Method tokens are letters only, which admits extension methods
//!   such as MERGE
//! - The snapshot carries a `date` header if no tier supplied one
//! - Transport headers are computed once, from the snapshot

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use tracing::Instrument;

use crate::error::{Error, Result};
use crate::headers::{merge, HeaderBearer, HeaderCollection};
use crate::identity::{Session, UserAgent};
use crate::message::{Body, Context, HttpMessage, Message, RequestUri, Response, Version};
use crate::observability::metrics;
use crate::outcome::Outcome;
use crate::transport::TransportRequest;

/// Method used when none is given.
pub const DEFAULT_METHOD: &str = "GET";

/// Header injected into send snapshots when absent.
pub const DATE_HEADER: &str = "date";

/// Everything a new request can be configured with.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Method token (default `GET`).
    pub method: Option<String>,
    /// Absolute URI (default `http://localhost/`).
    pub uri: Option<String>,
    /// Seed for the request tier.
    pub headers: HeaderCollection,
    pub body: Option<Body>,
    /// Protocol version (default: the agent's).
    pub version: Option<Version>,
}

/// An HTTP request bound to one session.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: String,
    uri: RequestUri,
}

fn validate_method(method: &str) -> Result<()> {
    if !method.is_empty() && method.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(Error::InvalidMethod(method.to_string()))
    }
}

/// IMF-fixdate rendering used for the `date` header.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl Request {
    /// Create a request attached to an agent (fresh session) or a session.
    pub fn new(context: impl Into<Context>, options: RequestOptions) -> Result<Self> {
        let method = options
            .method
            .unwrap_or_else(|| DEFAULT_METHOD.to_string());
        validate_method(&method)?;

        let mut message = Message::new(context.into());
        message.headers.extend_from(&options.headers);
        if let Some(version) = options.version {
            message.version = version;
        }

        let mut request = Self {
            message,
            method,
            uri: RequestUri::default(),
        };

        if let Some(uri) = options.uri.as_deref() {
            request.set_uri(uri);
        }

        match options.body {
            Some(Body::Bytes(bytes)) => request.set_body_bytes(bytes)?,
            Some(body) => request.message.body = body,
            None => {}
        }

        Ok(request)
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Set the method; fails unless the token is ASCII letters only.
    pub fn set_method(&mut self, method: &str) -> Result<()> {
        validate_method(method)?;
        self.method = method.to_string();
        Ok(())
    }

    /// Canonical URI string.
    pub fn uri(&self) -> &str {
        self.uri.as_str()
    }

    /// Assign the whole URI. Rejected values leave the current URI in place.
    pub fn set_uri(&mut self, uri: &str) {
        self.uri.set(uri);
    }

    /// Parsed view of the URI.
    pub fn request_uri(&self) -> &RequestUri {
        &self.uri
    }

    pub fn protocol(&self) -> String {
        self.uri.protocol()
    }

    pub fn set_protocol(&mut self, protocol: &str) {
        self.uri.set_protocol(protocol);
    }

    pub fn host(&self) -> &str {
        self.uri.host()
    }

    pub fn set_host(&mut self, host: &str) {
        self.uri.set_host(host);
    }

    pub fn port(&self) -> Option<u16> {
        self.uri.port()
    }

    pub fn effective_port(&self) -> u16 {
        self.uri.effective_port()
    }

    pub fn set_port(&mut self, port: u16) {
        self.uri.set_port(port);
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn set_path(&mut self, path: &str) {
        self.uri.set_path(path);
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn set_query(&mut self, query: &str) {
        self.uri.set_query(query);
    }

    /// Request headers merged over the session's merged view.
    pub fn all_headers(&self) -> HeaderCollection {
        merge(&self.message.headers, &self.session().all_headers())
    }

    /// Immutable copy used for sending: deep-copied headers plus a `date`
    /// header when no tier has one.
    pub fn snapshot(&self) -> Request {
        let mut snapshot = self.clone();
        if self.all_headers().get(DATE_HEADER).is_none() {
            snapshot
                .message
                .headers_mut()
                .set(DATE_HEADER, http_date(Utc::now()));
        }
        snapshot
    }

    /// Wire-level description of this request for the transport.
    pub fn transport_request(&self) -> TransportRequest {
        TransportRequest {
            scheme: self.uri.scheme().to_string(),
            host: self.uri.host().to_string(),
            port: self.uri.effective_port(),
            method: self.method.clone(),
            path: self.uri.path_and_query(),
            version: self.message.version,
            headers: self.all_headers(),
            body: self.message.body.clone(),
        }
    }

    /// Send a snapshot of this request; responses pass through unless
    /// rules are added to the returned outcome.
    pub fn send(&self) -> Outcome<Response> {
        Outcome::new(self.exchange())
    }

    /// Send a snapshot whose outcome resolves to whatever the registered
    /// handlers return. A response no rule handles is a rejection.
    pub fn send_routed<T: Send + 'static>(&self) -> Outcome<T> {
        Outcome::routed(self.exchange())
    }

    fn exchange(&self) -> BoxFuture<'static, Result<Response>> {
        let snapshot = Arc::new(self.snapshot());
        let outbound = snapshot.transport_request();
        let transport = snapshot.user_agent().transport();

        let span = tracing::debug_span!(
            "send",
            session_id = %snapshot.session().id(),
            method = %snapshot.method,
            uri = %snapshot.uri,
        );

        async move {
            let started = Instant::now();
            tracing::debug!("Sending request");

            match transport.execute(outbound).await {
                Ok(reply) => {
                    metrics::record_request(&snapshot.method, reply.status, started);
                    tracing::debug!(
                        status = reply.status,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Response received"
                    );
                    Response::from_transport(snapshot, reply)
                }
                Err(e) => {
                    metrics::record_transport_failure(&snapshot.method);
                    tracing::warn!(error = %e, "Transport failure");
                    Err(Error::Transport(e))
                }
            }
        }
        .instrument(span)
        .boxed()
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl HeaderBearer for Request {
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

/// Builder for `Request`; a context (agent or session) is required.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    user_agent: Option<UserAgent>,
    session: Option<Session>,
    options: RequestOptions,
}

impl RequestBuilder {
    /// Attach to a fresh session beneath `user_agent`.
    pub fn user_agent(mut self, user_agent: &UserAgent) -> Self {
        self.user_agent = Some(user_agent.clone());
        self
    }

    /// Attach to an existing session.
    pub fn session(mut self, session: &Session) -> Self {
        self.session = Some(session.clone());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.options.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.options.uri = Some(uri.into());
        self
    }

    /// Set a request-tier header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.options.headers.set(name, value);
        self
    }

    /// Add a request-tier header value.
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.options.headers.add(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.options.body = Some(body.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.options.version = Some(version);
        self
    }

    pub fn build(self) -> Result<Request> {
        let context = match (self.session, self.user_agent) {
            (Some(session), Some(ua)) if !session.user_agent().ptr_eq(&ua) => {
                return Err(Error::InvalidContext(
                    "session belongs to a different user agent".to_string(),
                ));
            }
            (Some(session), _) => Context::Session(session),
            (None, Some(ua)) => Context::UserAgent(ua),
            (None, None) => {
                return Err(Error::InvalidContext(
                    "expected a UserAgent or Session".to_string(),
                ));
            }
        };

        Request::new(context, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderValue;
    use crate::message::BodyStream;
    use bytes::Bytes;

    #[test]
    fn test_defaults() {
        let ua = UserAgent::new();
        let req = Request::new(&ua, RequestOptions::default()).unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.uri(), "http://localhost/");
        assert_eq!(req.version(), Version::Http11);
        assert_eq!(req.body().as_str(), Some(""));
        assert!(req.user_agent().ptr_eq(&ua));
    }

    #[test]
    fn test_method_validation() {
        let ua = UserAgent::new();
        let mut req = ua.create_request(RequestOptions::default()).unwrap();
        req.set_method("MERGE").unwrap();
        assert_eq!(req.method(), "MERGE");

        assert!(matches!(req.set_method("GET /"), Err(Error::InvalidMethod(_))));
        assert!(matches!(req.set_method(""), Err(Error::InvalidMethod(_))));
        assert_eq!(req.method(), "MERGE");

        let options = RequestOptions {
            method: Some("P0ST".to_string()),
            ..Default::default()
        };
        assert!(matches!(ua.create_request(options), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_version_validation() {
        let mut req = Request::builder()
            .user_agent(&UserAgent::new())
            .build()
            .unwrap();
        req.set_version("1.0").unwrap();
        assert_eq!(req.version(), Version::Http10);
        assert!(matches!(req.set_version("1.2"), Err(Error::InvalidVersion(_))));
        assert_eq!(req.version(), Version::Http10);
    }

    #[test]
    fn test_body_validation() {
        let mut req = Request::builder()
            .user_agent(&UserAgent::new())
            .build()
            .unwrap();
        req.set_body("payload");
        assert_eq!(req.body().as_str(), Some("payload"));

        req.set_body_bytes(Bytes::from_static(b"text")).unwrap();
        assert_eq!(req.body().as_str(), Some("text"));

        let err = req.set_body_bytes(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::InvalidBody(_)));
        assert_eq!(req.body().as_str(), Some("text"));

        let options = RequestOptions {
            body: Some(Body::Bytes(Bytes::from_static(&[0xc3]))),
            ..Default::default()
        };
        assert!(matches!(
            Request::new(&UserAgent::new(), options),
            Err(Error::InvalidBody(_))
        ));

        req.set_body_stream(BodyStream::new(futures_util::stream::empty::<
            std::result::Result<Bytes, std::io::Error>,
        >()));
        assert!(req.body().is_stream());
    }

    #[test]
    fn test_builder_requires_context() {
        let err = Request::builder().uri("http://example.com/").build().unwrap_err();
        assert!(matches!(err, Error::InvalidContext(_)));
    }

    #[test]
    fn test_builder_rejects_foreign_session() {
        let session = UserAgent::new().create_session();
        let err = Request::builder()
            .session(&session)
            .user_agent(&UserAgent::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidContext(_)));

        let req = Request::builder()
            .session(&session)
            .user_agent(session.user_agent())
            .build()
            .unwrap();
        assert!(req.session().ptr_eq(&session));
    }

    #[test]
    fn test_uri_accessors() {
        let mut req = Request::builder()
            .user_agent(&UserAgent::new())
            .uri("http://host/path?query")
            .build()
            .unwrap();
        assert_eq!(req.host(), "host");
        assert_eq!(req.path(), "/path");
        assert_eq!(req.query(), Some("query"));

        req.set_host("foo.com");
        req.set_path("/foo");
        req.set_query("foo");
        req.set_port(42);
        assert_eq!(req.uri(), "http://foo.com:42/foo?foo");

        req.set_uri("mailto:someone@example.com");
        assert_eq!(req.uri(), "http://foo.com:42/foo?foo");

        req.set_protocol("https");
        assert_eq!(req.protocol(), "https:");
        assert_eq!(req.effective_port(), 42);
    }

    #[test]
    fn test_three_tier_merge() {
        let mut ua = UserAgent::new();
        ua.add_header("x", "1");
        ua.set_header("foo", "agent");
        let mut session = ua.create_session();
        session.add_header("x", "2");
        session.set_header("bar", "session");

        let mut req = Request::builder()
            .session(&session)
            .add_header("x", "3")
            .header("foo", "request")
            .build()
            .unwrap();
        req.set_header("baz", "request");

        let merged = req.all_headers();
        assert_eq!(
            merged.get_value("x"),
            Some(&HeaderValue::List(vec!["3".into(), "2".into(), "1".into()]))
        );
        assert_eq!(merged.get("foo").as_deref(), Some("request"));
        assert_eq!(merged.get("bar").as_deref(), Some("session"));
        assert_eq!(merged.get("baz").as_deref(), Some("request"));
        assert!(merged.get("user-agent").is_some());

        // own tier only
        assert!(req.header("bar").is_none());
    }

    #[test]
    fn test_snapshot_injects_date_once() {
        let req = Request::builder()
            .user_agent(&UserAgent::new())
            .build()
            .unwrap();
        let snapshot = req.snapshot();
        let date = snapshot.header("date").unwrap();
        assert!(date.ends_with(" GMT"));
        assert!(req.header("date").is_none());

        let mut dated = req.clone();
        dated.set_header("Date", "Tue, 15 Nov 1994 08:12:31 GMT");
        assert_eq!(
            dated.snapshot().header("date").as_deref(),
            Some("Tue, 15 Nov 1994 08:12:31 GMT")
        );
    }

    #[test]
    fn test_transport_request_shape() {
        let req = Request::builder()
            .user_agent(&UserAgent::new())
            .method("POST")
            .uri("https://example.com:8443/items?page=2")
            .body("data")
            .build()
            .unwrap();
        let outbound = req.transport_request();
        assert_eq!(outbound.scheme, "https");
        assert_eq!(outbound.host, "example.com");
        assert_eq!(outbound.port, 8443);
        assert_eq!(outbound.method, "POST");
        assert_eq!(outbound.path, "/items?page=2");
        assert_eq!(outbound.body.as_str(), Some("data"));
        assert!(outbound.headers.get("user-agent").is_some());
    }

    #[test]
    fn test_http_date_format() {
        let at = DateTime::parse_from_rfc3339("1994-11-06T08:49:37Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(http_date(at), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
