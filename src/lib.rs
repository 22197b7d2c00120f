//! Client-side HTTP object model with status-routed outcomes.
//!
//! # Architecture Overview
//!
//! ```text
//!   UserAgent ──creates──▶ Session ──creates──▶ Request ──send()──▶ Outcome
//!   (agent tier)           (session tier)       (request tier)        │
//!        │                                          │                 │
//!        └──────── transport ◀──── snapshot ────────┘                 │
//!                      │                                              ▼
//!                      └──────▶ TransportResponse ──▶ Response ──▶ rule dispatch
//! ```
//!
//! Headers are stored per tier and merged inner-over-outer when a request
//! is sent. The outcome of a send carries an ordered list of status rules
//! that is frozen the first time it is awaited.

// Core model
pub mod error;
pub mod headers;
pub mod identity;
pub mod message;
pub mod outcome;

// Collaborators
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::ClientConfig;
pub use error::{BoxError, Error, Result};
pub use headers::{merge, HeaderBearer, HeaderCollection, HeaderValue};
pub use identity::{Session, UserAgent};
pub use message::{
    Body, BodyStream, HttpMessage, Request, RequestOptions, Response, ResponseOptions, Version,
};
pub use outcome::Outcome;
pub use transport::{HyperTransport, Transport, TransportRequest, TransportResponse};

/// Line terminator used in header blocks.
pub const CRLF: &str = "\r\n";

/// Port used when a URI names none and its scheme has no known default.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Create a UserAgent with the default transport.
pub fn create_user_agent() -> UserAgent {
    UserAgent::new()
}

/// Create a Session beneath a fresh default UserAgent.
pub fn create_session() -> Session {
    create_user_agent().create_session()
}

/// Create a Request in a fresh Session of a fresh default UserAgent.
pub fn create_request(options: RequestOptions) -> Result<Request> {
    create_user_agent().create_request(options)
}
