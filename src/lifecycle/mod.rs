//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown::trigger()
//!     → Signal::fired() resolves in the accept loop
//!     → listener socket dropped (no new connections)
//!     → in-flight connections run to completion on their own tasks
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, Signal};
