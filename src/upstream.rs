//! Upstream forwarding for handlers that relay to a remote origin.
//!
//! # Responsibilities
//! - Issue an outbound request from abstract pieces (method, URL, headers, body)
//! - Convert the reply into an abstract [`Response`] without re-encoding it
//! - Surface client timeouts as [`HandlerError::Timeout`] so the adapter
//!   answers 504
//!
//! # Design Decisions
//! - Request bodies stream upstream as they arrive (half-duplex); reply
//!   bodies stream back the same way
//! - Replies carrying `content-encoding` are marked encoded and relayed verbatim
//! - No retries; a failed call is the handler's error

use std::time::Duration;

use axum::http::Method;
use url::Url;

use crate::error::HandlerError;
use crate::http::headers::{from_native, header_value, is_connection_header};
use crate::model::{Body, Headers, Request, RequestParts, Response, ResponseParts};

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
}

impl Upstream {
    /// Build a client; `timeout` bounds each whole call.
    pub fn new(timeout: Option<Duration>) -> Result<Self, HandlerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Send one request and adapt the reply.
    pub async fn fetch(
        &self,
        method: &str,
        url: Url,
        headers: &Headers,
        body: Option<Body>,
    ) -> Result<Response, HandlerError> {
        let method = Method::from_bytes(method.as_bytes()).map_err(HandlerError::other)?;

        let mut outbound = self.client.request(method.clone(), url.clone());
        for (name, value) in headers.iter() {
            // Streamed bodies are framed by reqwest.
            if is_connection_header(name) || name == "content-length" {
                continue;
            }
            let value = header_value(name, value).map_err(HandlerError::other)?;
            outbound = outbound.header(name, value);
        }
        if let Some(body) = body {
            outbound = outbound.body(reqwest::Body::wrap_stream(body));
        }

        let reply = outbound.send().await?;
        let status = reply.status().as_u16();
        let headers = from_native(reply.headers());
        let encoded = headers.contains("content-encoding");

        tracing::debug!(
            method = %method,
            url = %url,
            status,
            encoded,
            "Upstream replied"
        );

        Ok(Response::from_parts(ResponseParts {
            status,
            headers,
            body: Some(Body::from_stream(reply.bytes_stream())),
            encoded,
        }))
    }

    /// Relay an inbound request to `target`, dropping its `host` header.
    pub async fn forward(&self, request: Request, target: Url) -> Result<Response, HandlerError> {
        let RequestParts {
            method,
            mut headers,
            body,
            ..
        } = request.into_parts();
        headers.remove("host");
        self.fetch(&method, target, &headers, body).await
    }
}
