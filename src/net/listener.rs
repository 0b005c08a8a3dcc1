//! Listener bootstrap.
//!
//! # Responsibilities
//! - Resolve the accepted option shapes into one `ListenConfig`
//! - Bind the configured address and report the bound address
//! - Accept incoming TCP connections, one task per connection
//! - Stop accepting when the caller's signal fires or `Server::close` is called
//!
//! # Design Decisions
//! - Bind failures propagate to the caller
//! - Stopping only drops the listening socket; in-flight connections run to
//!   completion on their own tasks
//! - Accept errors are logged and the loop keeps going

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServeOptions;
use crate::error::ServeError;
use crate::http::handler::Handler;
use crate::http::server::{serve_connection, Adapter};
use crate::lifecycle::{Shutdown, Signal};
use crate::net::connection::{ConnectionInfo, ConnectionTracker};

/// Pause after a failed accept, so persistent errors (e.g. fd exhaustion)
/// do not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handle to a running listener.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    task: JoinHandle<()>,
}

impl Server {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections.
    pub fn close(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the accept loop to finish.
    pub async fn closed(self) {
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "Accept loop terminated abnormally");
        }
    }

    /// Connections currently being served.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }
}

/// Bind a listener and serve every connection with `handler`.
///
/// Accepts anything convertible into [`ServeOptions`]: a port, a
/// [`ListenConfig`](crate::config::ListenConfig), or one of the
/// callback-carrying variants.
pub async fn serve<H>(handler: H, options: impl Into<ServeOptions>) -> Result<Server, ServeError>
where
    H: Handler,
{
    let (config, on_listen) = options.into().resolve();

    let listener = TcpListener::bind((config.hostname.as_str(), config.port))
        .await
        .map_err(|source| ServeError::Bind {
            host: config.hostname.clone(),
            port: config.port,
            source,
        })?;
    let local_addr = listener.local_addr().map_err(ServeError::LocalAddr)?;

    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let tracker = ConnectionTracker::new();
    let task = tokio::spawn(accept_loop(
        listener,
        Arc::new(Adapter::new(handler)),
        shutdown.signal(),
        config.signal,
        tracker.clone(),
    ));

    if let Some(callback) = on_listen {
        callback(local_addr);
    }

    Ok(Server {
        local_addr,
        shutdown,
        tracker,
        task,
    })
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    adapter: Arc<Adapter<H>>,
    mut closing: Signal,
    mut cancel: Option<Signal>,
    tracker: ConnectionTracker,
) {
    loop {
        let (stream, peer_addr) = tokio::select! {
            biased;
            _ = closing.fired() => {
                tracing::info!("Listener closed");
                break;
            }
            _ = fired(&mut cancel) => {
                tracing::info!("Cancellation signal received, listener stopped");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            },
        };

        let guard = tracker.track();
        let adapter = Arc::clone(&adapter);
        tokio::spawn(async move {
            tracing::debug!(connection_id = %guard.id(), peer_addr = %peer_addr, "Connection accepted");
            if let Err(err) = serve_connection(stream, ConnectionInfo::plain(peer_addr), adapter).await {
                tracing::debug!(connection_id = %guard.id(), error = %err, "Connection error");
            }
            drop(guard);
        });
    }
}

async fn fired(signal: &mut Option<Signal>) {
    match signal {
        Some(signal) => signal.fired().await,
        None => std::future::pending().await,
    }
}
