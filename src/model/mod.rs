//! Transport-neutral request/response model.
//!
//! # Data Flow
//! ```text
//! native request ──▶ http::request (builds Request) ──▶ Handler
//! Handler ──▶ Response ──▶ http::response (writes native response)
//! ```
//!
//! # Design Decisions
//! - Headers are a multimap with lower-cased names; no union-typed values
//! - Bodies are pulled lazily and consumed once
//! - Requests are read-only once built

pub mod body;
pub mod headers;
pub mod request;
pub mod response;

pub use body::Body;
pub use headers::Headers;
pub use request::{Duplex, Request, RequestParts};
pub use response::{Response, ResponseParts};
