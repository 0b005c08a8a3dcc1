//! Lazy, single-consumption byte stream.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, Stream, StreamExt};

use crate::error::BoxError;

/// Streaming body shared by requests and responses.
///
/// Chunks are pulled on demand; nothing is buffered unless the consumer
/// asks for it with [`Body::bytes`] or [`Body::text`].
pub struct Body {
    stream: BoxStream<'static, Result<Bytes, BoxError>>,
}

impl Body {
    pub fn empty() -> Self {
        Self {
            stream: stream::empty().boxed(),
        }
    }

    /// Wrap any fallible chunk stream.
    pub fn from_stream<S, E>(source: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            stream: source.map(|chunk| chunk.map_err(Into::into)).boxed(),
        }
    }

    /// Pull the next chunk, if any.
    pub async fn chunk(&mut self) -> Option<Result<Bytes, BoxError>> {
        self.stream.next().await
    }

    /// Drain the stream into one buffer.
    pub async fn bytes(mut self) -> Result<Bytes, BoxError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.chunk().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    pub async fn text(self) -> Result<String, BoxError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            stream: stream::once(async move { Ok(bytes) }).boxed(),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_chunks_in_order() {
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"world")),
        ];
        let body = Body::from_stream(stream::iter(chunks));
        assert_eq!(body.text().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn surfaces_stream_errors() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = Body::from_stream(stream::iter(chunks));
        let err = body.bytes().await.unwrap_err();
        assert_eq!(err.to_string(), "reset");
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        let mut body = Body::empty();
        assert!(body.chunk().await.is_none());
    }
}
