//! Edge Adapter Library
//!
//! Runs a transport-neutral request handler on a native HTTP/1.1 server:
//! inbound exchanges become abstract [`Request`]s, the handler's abstract
//! [`Response`] is written back with the declared `content-encoding`
//! applied on the fly.
//!
//! ```text
//!   client ──▶ net::listener ──▶ http::server ──▶ http::request ──▶ Handler
//!                                                                   │
//!   client ◀── hyper ◀── http::compression ◀── http::response ◀─────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod net;
pub mod observability;
pub mod upstream;

pub use config::{ListenConfig, ServeOptions};
pub use error::{HandlerError, ServeError, WriteError};
pub use http::{Handler, SyncHandler};
pub use lifecycle::{Shutdown, Signal};
pub use model::{Body, Headers, Request, Response};
pub use net::{serve, Server};
pub use upstream::Upstream;
