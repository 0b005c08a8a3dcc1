//! Native request → abstract [`Request`].
//!
//! # Responsibilities
//! - Pick the scheme from the connection (`https` when encrypted)
//! - Rebuild the absolute URL from the `host` header and request target
//! - Translate headers, dropping connection-management ones
//! - Expose the body lazily for methods that carry one
//!
//! # Design Decisions
//! - GET and HEAD never get a body, whatever the client sent
//! - A target that does not resolve to a URL is a handler-stage failure

use axum::body::{Body as NativeBody, HttpBody};
use axum::http::header::HOST;
use axum::http::{Method, Request as NativeRequest};
use bytes::Bytes;
use url::Url;

use crate::error::{BoxError, HandlerError};
use crate::http::headers::from_native;
use crate::model::{Body, Request};
use crate::net::connection::ConnectionInfo;

/// Host used when the client sent none.
const DEFAULT_HOST: &str = "localhost";

/// Build the abstract request for one inbound exchange.
pub fn build_request<B>(native: NativeRequest<B>, conn: &ConnectionInfo) -> Result<Request, HandlerError>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = native.into_parts();

    let url = absolute_url(&parts, conn)?;
    let headers = from_native(&parts.headers);
    let request = Request::new(parts.method.as_str(), url, headers);

    if parts.method == Method::GET || parts.method == Method::HEAD {
        return Ok(request);
    }

    let stream = NativeBody::new(body).into_data_stream();
    Ok(request.with_body(Body::from_stream(stream)))
}

fn absolute_url(parts: &axum::http::request::Parts, conn: &ConnectionInfo) -> Result<Url, HandlerError> {
    let scheme = if conn.encrypted { "https" } else { "http" };
    // A Host that is present but not visible ASCII is rejected, never skipped.
    let host = match parts.headers.get(HOST) {
        Some(value) => value.to_str().map_err(|_| HandlerError::MalformedUrl {
            target: format!(
                "{}://{}{}",
                scheme,
                String::from_utf8_lossy(value.as_bytes()),
                parts.uri.path_and_query().map_or("/", |p| p.as_str())
            ),
            source: url::ParseError::InvalidDomainCharacter,
        })?,
        None => parts
            .uri
            .authority()
            .map(|a| a.as_str())
            .unwrap_or(DEFAULT_HOST),
    };

    let origin = format!("{}://{}", scheme, host);
    let target = parts.uri.to_string();

    Url::parse(&origin)
        .and_then(|base| base.join(&target))
        .map_err(|source| HandlerError::MalformedUrl {
            target: format!("{}{}", origin, target),
            source,
        })
}
