//! Identity chain subsystem.
//!
//! # Data Flow
//! ```text
//! UserAgent ──create_session()──→ Session ──create_request()──→ Request
//!   (tier 1)                       (tier 2)                       (tier 3)
//! ```
//!
//! # Design Decisions
//! - Agents and sessions are shared handles (`Arc`); requests own theirs
//! - Children hold a reference to their parent, never the other way round
//! - Each tier lock guards one operation at a time; there is no
//!   cross-operation atomicity, so callers racing header mutations on a
//!   shared tier must serialize themselves

pub mod session;
pub mod user_agent;

pub use session::Session;
pub use user_agent::{UserAgent, UserAgentBuilder, DEFAULT_USER_AGENT};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::headers::HeaderCollection;

// A panic while holding a tier lock leaves the collection in a valid state,
// so poisoning is ignored.
pub(crate) fn read_tier(lock: &RwLock<HeaderCollection>) -> RwLockReadGuard<'_, HeaderCollection> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_tier(lock: &RwLock<HeaderCollection>) -> RwLockWriteGuard<'_, HeaderCollection> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
