//! HTTP translation layer.
//!
//! # Data Flow
//! ```text
//! hyper connection
//!     → server.rs (per-exchange adapter, error recovery)
//!     → request.rs (native request → abstract Request)
//!     → headers.rs (native ↔ abstract headers)
//!     → [user Handler] (handler.rs contract)
//!     → response.rs (abstract Response → native response)
//!     → compression.rs (encoder chain between body and connection)
//!     → Send to client
//! ```

pub mod compression;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use compression::{CompressionChain, Encoding};
pub use handler::{BoxFuture, Handler, SyncHandler};
pub use response::NativeResponse;
pub use server::{serve_connection, Adapter};
