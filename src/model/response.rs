//! Abstract response.

use super::{Body, Headers};

/// Transport-neutral response produced by a handler or synthesized by the
/// adapter on failure.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Option<Body>,
    encoded: bool,
}

impl Response {
    /// `200 OK` with the given body.
    pub fn new(body: impl Into<Body>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Some(body.into()),
            encoded: false,
        }
    }

    /// Response with no body at all.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
            encoded: false,
        }
    }

    /// Append a header value (builder style).
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Declare that the body bytes already match `content-encoding`, so the
    /// writer relays them without compressing again.
    pub fn encoded(mut self) -> Self {
        self.encoded = true;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded
    }

    pub fn into_parts(self) -> ResponseParts {
        ResponseParts {
            status: self.status,
            headers: self.headers,
            body: self.body,
            encoded: self.encoded,
        }
    }

    pub fn from_parts(parts: ResponseParts) -> Self {
        Self {
            status: parts.status,
            headers: parts.headers,
            body: parts.body,
            encoded: parts.encoded,
        }
    }
}

/// Owned pieces of a [`Response`].
#[derive(Debug)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: Headers,
    pub body: Option<Body>,
    pub encoded: bool,
}
