//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → UserAgent::from_config / init_logging
//! ```
//!
//! # Design Decisions
//! - Config is read once; agents built from it do not observe later edits
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_str, ConfigError};
pub use schema::{AgentConfig, ClientConfig, ObservabilityConfig, TransportConfig};
pub use validation::{validate_config, ValidationError};
