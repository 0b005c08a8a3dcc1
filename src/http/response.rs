//! Abstract response → native response.
//!
//! # Responsibilities
//! - Flatten headers and settle `content-length`
//! - Build the compression chain from `content-encoding`
//! - Stream the body through the chain into the native body
//! - Produce a minimal `text/plain` 500 when writing fails
//!
//! # Design Decisions
//! - Headers are final once the native response is returned; hyper writes
//!   the head before polling the body
//! - The body is pulled one chunk per poll, so hyper's readiness is the
//!   only backpressure needed
//! - Errors after the head is out are logged and abort the connection

use std::io::{self, Write};

use axum::body::Body as NativeBody;
use axum::http::header::{HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;

use crate::error::WriteError;
use crate::http::compression::{CompressionChain, Stage};
use crate::http::headers::to_native;
use crate::model::{Body, Headers, Response, ResponseParts};

/// Response type handed back to hyper.
pub type NativeResponse = axum::http::Response<NativeBody>;

/// Convert an abstract response into a native one.
pub fn write_response(response: Response) -> Result<NativeResponse, WriteError> {
    let ResponseParts {
        status,
        headers,
        body,
        encoded,
    } = response.into_parts();

    let status = StatusCode::from_u16(status).map_err(|_| WriteError::InvalidStatus(status))?;
    let mut native_headers = to_native(&headers)?;

    let chain = if encoded {
        CompressionChain::default()
    } else {
        CompressionChain::from_header(native_headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok()))
    };

    // Compressed output has an unknown length; only trust the declared one
    // when bytes go out untouched.
    if chain.is_empty() {
        if let Some(length) = declared_content_length(&headers) {
            native_headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
    }

    tracing::debug!(
        status = status.as_u16(),
        encoders = chain.len(),
        "Writing response head"
    );

    let mut native = NativeResponse::new(pipe_body(body, &chain));
    *native.status_mut() = status;
    *native.headers_mut() = native_headers;
    Ok(native)
}

/// Minimal `500 text/plain` response carrying the write failure's trace.
pub fn fallback_response(err: &WriteError) -> NativeResponse {
    let mut native = NativeResponse::new(NativeBody::from(err.diagnostic()));
    *native.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    native.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=UTF-8"),
    );
    native
}

/// Leading decimal digits of `content-length`, if any.
fn declared_content_length(headers: &Headers) -> Option<u64> {
    let value = headers.get("content-length")?;
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn pipe_body(body: Option<Body>, chain: &CompressionChain) -> NativeBody {
    if chain.is_empty() {
        return match body {
            Some(body) => NativeBody::from_stream(
                body.filter(|chunk| {
                    let keep = !matches!(chunk, Ok(bytes) if bytes.is_empty());
                    async move { keep }
                })
                .inspect(log_body_error),
            ),
            None => NativeBody::empty(),
        };
    }

    let (head, outlet) = chain.attach();
    let pipe = Pipe {
        source: body,
        head: Some(head),
        outlet,
    };
    let frames = stream::unfold(pipe, |mut pipe| async move {
        let item = pipe.next().await?;
        Some((item, pipe))
    });
    NativeBody::from_stream(frames.inspect(log_body_error))
}

fn log_body_error<E: std::fmt::Display>(chunk: &Result<Bytes, E>) {
    if let Err(e) = chunk {
        tracing::error!(error = %e, "Response body failed after head was written");
    }
}

/// Drives body chunks through the compression stages.
struct Pipe {
    source: Option<Body>,
    /// `None` once closed (or failed).
    head: Option<Box<dyn Stage>>,
    outlet: mpsc::UnboundedReceiver<Bytes>,
}

impl Pipe {
    async fn next(&mut self) -> Option<io::Result<Bytes>> {
        loop {
            if let Ok(bytes) = self.outlet.try_recv() {
                return Some(Ok(bytes));
            }

            let head = self.head.as_mut()?;
            let chunk = match self.source.as_mut() {
                Some(source) => source.chunk().await,
                None => None,
            };

            match chunk {
                Some(Ok(bytes)) if bytes.is_empty() => continue,
                Some(Ok(bytes)) => {
                    if let Err(e) = head.write_all(&bytes).and_then(|_| head.flush()) {
                        self.head = None;
                        return Some(Err(e));
                    }
                }
                Some(Err(e)) => {
                    self.head = None;
                    return Some(Err(io::Error::other(e)));
                }
                None => {
                    self.source = None;
                    if let Some(head) = self.head.take() {
                        if let Err(e) = head.close() {
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}
