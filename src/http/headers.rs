//! Conversion between native `HeaderMap`s and the abstract [`Headers`].
//!
//! # Responsibilities
//! - Native → abstract: one entry per native value, connection-management
//!   headers dropped
//! - Abstract → native: lower-cased names, `set-cookie` kept as separate
//!   lines, `content-length` left to the response writer
//!
//! # Design Decisions
//! - Native values are byte strings: anything that is not plain ASCII is
//!   read as Latin-1 and written back as Latin-1, so obs-text survives a
//!   relay unchanged; characters beyond U+00FF go out as UTF-8
//! - Invalid names/values on the way out are a write failure

use std::borrow::Cow;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, SET_COOKIE};

use crate::error::WriteError;
use crate::model::Headers;

/// Headers owned by the transport; never replayed into the abstract model.
pub const CONNECTION_HEADERS: [&str; 4] = ["transfer-encoding", "connection", "keep-alive", "expect"];

pub fn is_connection_header(name: &str) -> bool {
    CONNECTION_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Copy native headers into a multimap, skipping connection-management ones.
pub fn from_native(native: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in native.iter() {
        if is_connection_header(name.as_str()) {
            continue;
        }
        headers.append(name.as_str(), decode_value(value));
    }
    headers
}

/// Flatten a multimap into native headers.
///
/// `content-length` is never copied; the caller decides whether it
/// survives.
pub fn to_native(headers: &Headers) -> Result<HeaderMap, WriteError> {
    let mut native = HeaderMap::with_capacity(headers.len());
    for name in headers.names() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| WriteError::InvalidHeaderName(name.to_owned()))?;

        if header_name == CONTENT_LENGTH {
            continue;
        }

        if header_name == SET_COOKIE {
            for cookie in headers.get_all(name) {
                native.append(SET_COOKIE, header_value(name, cookie)?);
            }
            continue;
        }

        if let Some(value) = headers.get(name) {
            native.insert(header_name, header_value(name, &value)?);
        }
    }
    Ok(native)
}

/// Encode one abstract value for the wire.
pub fn header_value(name: &str, value: &str) -> Result<HeaderValue, WriteError> {
    let bytes: Cow<'_, [u8]> = if !value.is_ascii() && value.chars().all(|c| u32::from(c) <= 0xFF) {
        Cow::Owned(value.chars().map(|c| u32::from(c) as u8).collect())
    } else {
        Cow::Borrowed(value.as_bytes())
    };
    HeaderValue::from_bytes(&bytes).map_err(|source| WriteError::InvalidHeaderValue {
        name: name.to_owned(),
        source,
    })
}

fn decode_value(value: &HeaderValue) -> String {
    match value.to_str() {
        Ok(v) => v.to_owned(),
        Err(_) => value.as_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}
