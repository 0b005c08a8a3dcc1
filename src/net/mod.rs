//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! serve(handler, options)
//!     → listener.rs (resolve options, bind, accept loop)
//!     → connection.rs (connection info, lifecycle tracking)
//!     → Hand off to HTTP layer (http::server::serve_connection)
//! ```
//!
//! # Design Decisions
//! - Each connection runs on its own task
//! - Each connection tracked so the server handle can report what is left
//! - TLS is not terminated here; callers that do can use
//!   `serve_connection` directly with `encrypted` set

pub mod connection;
pub mod listener;

pub use connection::{ConnectionInfo, ConnectionTracker};
pub use listener::{serve, Server};
