//! Abstract request.

use url::Url;

use super::{Body, Headers};

/// Marks an exchange whose request body is read while the response may
/// already be written on the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
}

/// Transport-neutral request handed to a [`Handler`](crate::http::Handler).
///
/// Built once per inbound exchange and read-only afterwards; the body can
/// only be taken by consuming the request.
#[derive(Debug)]
pub struct Request {
    method: String,
    url: Url,
    headers: Headers,
    body: Option<Body>,
    duplex: Option<Duplex>,
}

impl Request {
    /// Request without a body.
    pub fn new(method: impl Into<String>, url: Url, headers: Headers) -> Self {
        Self {
            method: method.into(),
            url,
            headers,
            body: None,
            duplex: None,
        }
    }

    /// Attach a streaming body and mark the exchange half-duplex.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self.duplex = Some(Duplex::Half);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn duplex(&self) -> Option<Duplex> {
        self.duplex
    }

    pub fn into_body(self) -> Option<Body> {
        self.body
    }

    pub fn into_parts(self) -> RequestParts {
        RequestParts {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Owned pieces of a consumed [`Request`].
#[derive(Debug)]
pub struct RequestParts {
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Body>,
}
