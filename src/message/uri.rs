//! Request URI facade.
//!
//! # Responsibilities
//! - Keep one canonical absolute URI as the source of truth
//! - Derive protocol/host/port/path/query from it on every read
//! - Rewrite it through component setters
//!
//! # Design Decisions
//! - Only `http` and `https` are accepted, and never with user-info
//! - Rejected assignments leave the previous URI untouched
//! - Setters that cannot apply (e.g. an unusable host) are silent no-ops
//! - `url` performs the parse/format cycle, so the stored form is always
//!   canonical (lowercased scheme and host, default ports elided)

use std::fmt;

use url::Url;

/// URI every new request starts with.
pub const DEFAULT_URI: &str = "http://localhost/";

/// Canonical absolute URI of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri {
    url: Url,
}

impl RequestUri {
    /// Parse an accepted URI, or `None` if it would be rejected.
    pub fn parse(uri: &str) -> Option<Self> {
        let url = Url::parse(uri).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if !url.username().is_empty() || url.password().is_some() {
            return None;
        }
        Some(Self { url })
    }

    /// Replace the whole URI. Returns false (and keeps the old value) if rejected.
    pub fn set(&mut self, uri: &str) -> bool {
        match Self::parse(uri) {
            Some(parsed) => {
                *self = parsed;
                true
            }
            None => {
                tracing::debug!(uri = %uri, current = %self.url, "Rejected URI assignment");
                false
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Scheme with its trailing colon, e.g. `"https:"`.
    pub fn protocol(&self) -> String {
        format!("{}:", self.url.scheme())
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Switch between `http` and `https`; accepts an optional trailing colon.
    pub fn set_protocol(&mut self, protocol: &str) {
        let scheme = protocol.strip_suffix(':').unwrap_or(protocol);
        if matches!(scheme, "http" | "https") {
            let _ = self.url.set_scheme(scheme);
        }
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn set_host(&mut self, host: &str) {
        if self.url.set_host(Some(host)).is_err() {
            tracing::debug!(host = %host, "Ignoring unusable host");
        }
    }

    /// Explicit port, `None` when the scheme default applies.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// Port a connection goes to.
    pub fn effective_port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(crate::DEFAULT_HTTP_PORT)
    }

    pub fn set_port(&mut self, port: u16) {
        let _ = self.url.set_port(Some(port));
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn set_path(&mut self, path: &str) {
        self.url.set_path(path);
    }

    /// Query without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn set_query(&mut self, query: &str) {
        self.url.set_query(Some(query));
    }

    /// Origin-form target sent on the request line.
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

impl Default for RequestUri {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_URI).expect("default URI is valid"),
        }
    }
}

impl fmt::Display for RequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
