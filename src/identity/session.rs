//! Per-conversation session, the middle header tier.

use std::fmt;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::Result;
use crate::headers::{merge, HeaderBearer, HeaderCollection};
use crate::identity::{read_tier, write_tier, UserAgent};
use crate::message::{Request, RequestOptions};

struct SessionInner {
    id: Uuid,
    user_agent: UserAgent,
    headers: RwLock<HeaderCollection>,
}

/// A session beneath exactly one `UserAgent`.
///
/// Cheap to clone; clones share the same header tier.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create an empty session beneath `user_agent`.
    pub fn new(user_agent: &UserAgent) -> Self {
        Self::with_headers(user_agent, &HeaderCollection::new())
    }

    /// Create a session whose tier starts as a copy of `headers`.
    ///
    /// The copy is one-shot: later changes to either side stay local.
    pub fn with_headers(user_agent: &UserAgent, headers: &HeaderCollection) -> Self {
        let mut tier = HeaderCollection::new();
        tier.extend_from(headers);

        let session = Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                user_agent: user_agent.clone(),
                headers: RwLock::new(tier),
            }),
        };
        tracing::trace!(session_id = %session.id(), "Session created");
        session
    }

    /// Identifier used to correlate log events of this session.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn user_agent(&self) -> &UserAgent {
        &self.inner.user_agent
    }

    /// Create a request in this session.
    pub fn create_request(&self, options: RequestOptions) -> Result<Request> {
        Request::new(self, options)
    }

    /// Session headers merged over the agent's, recomputed on every call.
    pub fn all_headers(&self) -> HeaderCollection {
        merge(&read_tier(&self.inner.headers), &self.inner.user_agent.all_headers())
    }

    /// True if both handles refer to the same session.
    pub fn ptr_eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl HeaderBearer for Session {
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

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("headers", &*read_tier(&self.inner.headers))
            .finish()
    }
}
