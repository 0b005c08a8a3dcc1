//! Per-exchange adapter and per-connection serving.
//!
//! # Responsibilities
//! - Build the abstract request, invoke the handler, recover from failures
//! - Hand the response to the writer, with one fallback attempt
//! - Serve a single connection with hyper's HTTP/1.1 implementation
//!
//! # Error Policy
//! ```text
//! handler timeout          → 504, empty body
//! any other handler error  → 500, diagnostic trace as body
//! malformed request URL    → 500, diagnostic trace as body
//! write failure            → 500 text/plain, write failure's trace
//! ```
//! Nothing is retried.

use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::HttpBody;
use axum::http::Request as NativeRequest;
use bytes::Bytes;
use futures_util::FutureExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::io::{AsyncRead, AsyncWrite};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::{BoxError, ErrorKind, HandlerError};
use crate::http::handler::Handler;
use crate::http::request::build_request;
use crate::http::response::{fallback_response, write_response, NativeResponse};
use crate::model::Response;
use crate::net::connection::ConnectionInfo;

/// Bridges native exchanges to a [`Handler`].
pub struct Adapter<H> {
    handler: H,
}

impl<H: Handler> Adapter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Handle one native exchange end to end. Never fails: every error is
    /// turned into a response.
    pub async fn handle<B>(&self, native: NativeRequest<B>, conn: ConnectionInfo) -> NativeResponse
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let method = native.method().clone();
        let uri = native.uri().clone();

        let response = match self.dispatch(native, &conn).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    method = %method,
                    uri = %uri,
                    kind = err.kind().name(),
                    error = %err.diagnostic(),
                    "Handler failed"
                );
                error_response(&err)
            }
        };

        match write_response(response) {
            Ok(native) => native,
            Err(err) => {
                tracing::error!(
                    method = %method,
                    uri = %uri,
                    error = %err.diagnostic(),
                    "Failed to write response"
                );
                fallback_response(&err)
            }
        }
    }

    async fn dispatch<B>(&self, native: NativeRequest<B>, conn: &ConnectionInfo) -> Result<Response, HandlerError>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let request = build_request(native, conn)?;

        // A panic may come from the synchronous part of `call` or from
        // polling the returned future.
        let future = std::panic::catch_unwind(AssertUnwindSafe(|| self.handler.call(request)))
            .map_err(|panic| HandlerError::Panic(panic_message(panic)))?;

        AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panic(panic_message(panic))))
    }
}

/// Response synthesized for a failed handler.
pub fn error_response(err: &HandlerError) -> Response {
    match err.kind() {
        ErrorKind::Timeout => Response::empty(504),
        ErrorKind::Other => Response::with_status(500, err.diagnostic())
            .header("content-type", "text/plain; charset=UTF-8"),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Serve every exchange arriving on one connection.
///
/// `conn.encrypted` decides the URL scheme, so callers terminating TLS
/// themselves pass `true` here.
pub async fn serve_connection<IO, H>(
    io: IO,
    conn: ConnectionInfo,
    adapter: Arc<Adapter<H>>,
) -> Result<(), hyper::Error>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    H: Handler,
{
    let service = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .service(tower::service_fn(move |req: NativeRequest<Incoming>| {
            let adapter = Arc::clone(&adapter);
            async move { Ok::<_, Infallible>(adapter.handle(req, conn).await) }
        }));

    http1::Builder::new()
        .serve_connection(TokioIo::new(io), TowerToHyperService::new(service))
        .await
}
