//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (handler failures, write failures, listener lifecycle)
//!     → tower_http TraceLayer spans (one per exchange)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - The library only emits events; installing a subscriber is the binary's job
//! - `RUST_LOG` overrides the configured filter

pub mod logging;

pub use logging::init;
