//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request::send / outcome dispatch produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → fmt subscriber (stdout, pretty or JSON)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Library code only emits; installing subscribers and recorders is the
//!   binary's job
//! - Metrics without an installed recorder are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
