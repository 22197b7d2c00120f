//! Application-level agent, the outermost header tier.
//!
//! # Responsibilities
//! - Own the outermost header tier and the default identification header
//! - Own the transport used by every request created beneath it
//! - Create sessions (and requests through fresh sessions)

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::headers::{HeaderBearer, HeaderCollection};
use crate::identity::{read_tier, write_tier, Session};
use crate::message::{Request, RequestOptions, Version};
use crate::transport::{HyperTransport, Transport};

/// Identification header seeded into every agent that doesn't set its own.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Header name of the identification header.
pub const USER_AGENT_HEADER: &str = "user-agent";

struct AgentInner {
    headers: RwLock<HeaderCollection>,
    transport: Arc<dyn Transport>,
    version: Version,
}

/// Root of the identity chain.
///
/// Cheap to clone; clones share the same header tier and transport.
#[derive(Clone)]
pub struct UserAgent {
    inner: Arc<AgentInner>,
}

impl UserAgent {
    /// Create an agent with the default transport and no extra headers.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create an agent seeded with `headers`.
    pub fn with_headers(headers: HeaderCollection) -> Self {
        Self::builder().headers(headers).build()
    }

    pub fn builder() -> UserAgentBuilder {
        UserAgentBuilder::default()
    }

    /// Build an agent from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .headers(config.agent.default_headers.clone())
            .version(Version::from_str(&config.agent.version)?)
            .transport(Arc::new(HyperTransport::from_config(&config.transport)));

        if let Some(identification) = &config.agent.user_agent {
            builder = builder.identification(identification.clone());
        }

        Ok(builder.build())
    }

    /// Create a new session beneath this agent.
    pub fn create_session(&self) -> Session {
        Session::new(self)
    }

    /// Create a new session whose tier starts as a copy of `headers`.
    pub fn create_session_with(&self, headers: &HeaderCollection) -> Session {
        Session::with_headers(self, headers)
    }

    /// Create a request in a fresh session.
    pub fn create_request(&self, options: RequestOptions) -> Result<Request> {
        Request::new(self, options)
    }

    /// Headers of this tier. The agent is the outermost tier, so this is
    /// also its merged view.
    pub fn all_headers(&self) -> HeaderCollection {
        self.headers()
    }

    /// Transport shared by every request under this agent.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.inner.transport)
    }

    /// Protocol version given to new requests.
    pub fn default_version(&self) -> Version {
        self.inner.version
    }

    /// True if both handles refer to the same agent.
    pub fn ptr_eq(&self, other: &UserAgent) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for UserAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderBearer for UserAgent {
    fn headers(&self) -> HeaderCollection {
        read_tier(&self.inner.headers).clone()
    }

    fn set_header(&mut self, name: &str, value: &str) {
        write_tier(&self.inner.headers).set(name, value);
    }

    fn add_header(&mut self, name: &str, value: &str) {
        write_tier(&self.inner.headers).add(name, value);
    }
}

impl fmt::Debug for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAgent")
            .field("headers", &*read_tier(&self.inner.headers))
            .field("version", &self.inner.version)
            .field("transport", &self.inner.transport)
            .finish()
    }
}

/// Builder for `UserAgent`.
#[derive(Default)]
pub struct UserAgentBuilder {
    headers: HeaderCollection,
    identification: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    version: Version,
}

impl UserAgentBuilder {
    /// Seed the agent tier (lists are added, scalars set).
    pub fn headers(mut self, headers: HeaderCollection) -> Self {
        self.headers.extend_from(&headers);
        self
    }

    /// Add one header value to the agent tier.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Identification header to use when the seeded headers carry none.
    pub fn identification(mut self, value: impl Into<String>) -> Self {
        self.identification = Some(value.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> UserAgent {
        let mut headers = self.headers;
        if headers.get(USER_AGENT_HEADER).is_none() {
            let identification = self
                .identification
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
            headers.set(USER_AGENT_HEADER, identification);
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HyperTransport::new()));

        UserAgent {
            inner: Arc::new(AgentInner {
                headers: RwLock::new(headers),
                transport,
                version: self.version,
            }),
        }
    }
}
