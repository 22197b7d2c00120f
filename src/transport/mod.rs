//! Transport seam.
//!
//! # Responsibilities
//! - Describe one outbound exchange in wire terms (`TransportRequest`)
//! - Describe what came back (`TransportResponse`)
//! - Let agents swap the network implementation (`Transport`)
//!
//! # Design Decisions
//! - Transports receive the fully merged header set and never see tiers
//! - Errors are boxed and passed through to the caller untouched
//! - `HyperTransport` is the default; tests plug in recording transports

pub mod hyper;

pub use self::hyper::HyperTransport;

use std::fmt;

use bytes::Bytes;
use futures_util::future::BoxFuture;

use crate::error::BoxError;
use crate::headers::HeaderCollection;
use crate::message::{Body, Version};

/// One outbound exchange as the transport sees it.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// `http` or `https`.
    pub scheme: String,
    pub host: String,
    /// Effective port (scheme default when the URI has none).
    pub port: u16,
    pub method: String,
    /// Origin-form target: path plus `?query` when present.
    pub path: String,
    pub version: Version,
    /// Merged view of every header tier.
    pub headers: HeaderCollection,
    pub body: Body,
}

/// What a transport hands back for a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub version: Version,
    pub status: u16,
    pub headers: HeaderCollection,
    pub body: Bytes,
}

/// Performs exchanges for every request created under an agent.
pub trait Transport: Send + Sync + fmt::Debug {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, BoxError>>;
}
