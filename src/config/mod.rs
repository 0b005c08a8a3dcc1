//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ServeOptions (one variant per call shape)
//!     → resolve() → ListenConfig + optional listen callback
//!
//! config file (TOML, demo binary)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, ListenConfig, LogFormat, LoggingConfig, OnListen, ServeOptions, UpstreamConfig,
    UpstreamRoute,
};
