//! Header storage subsystem.
//!
//! # Data Flow
//! ```text
//! UserAgent tier ─┐
//!                 ├─ merge.rs ─┐
//! Session tier  ──┘            ├─ merge.rs ─→ headers handed to transport
//! Request tier  ───────────────┘
//! ```
//!
//! Each tier owns an independent `HeaderCollection`; merged views are
//! recomputed on demand and never cached.

pub mod collection;
pub mod merge;

pub use collection::{HeaderCollection, HeaderValue};
pub use merge::merge;

/// Capability shared by every header-carrying type.
///
/// Implemented independently by `UserAgent`, `Session`, `Request` and
/// `Response`. Shared handles (`UserAgent`, `Session`) mutate through their
/// internal lock, so `&mut` on a handle clone reaches the same tier.
pub trait HeaderBearer {
    /// Copy of this tier's own headers (no aliasing, no merge).
    fn headers(&self) -> HeaderCollection;

    /// Set a header on this tier, overwriting.
    fn set_header(&mut self, name: &str, value: &str);

    /// Add a header value on this tier.
    fn add_header(&mut self, name: &str, value: &str);

    /// Single header of this tier, comma-joined for lists.
    fn header(&self, name: &str) -> Option<String> {
        self.headers().get(name)
    }

    /// Tier headers as an HTTP header block.
    fn header_block(&self) -> String {
        self.headers().to_header_block()
    }
}
