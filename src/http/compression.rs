//! Response compression chain.
//!
//! # Responsibilities
//! - Parse a `content-encoding` list into an ordered set of encoders
//! - Attach the encoders to an output sink, last stage first
//! - Push body chunks through the chain and finish every stage on close
//!
//! # Data Flow
//! ```text
//! body chunk ─▶ stage[0] ─▶ stage[1] ─▶ ... ─▶ Sink ─▶ outlet (connection)
//! ```
//!
//! # Design Decisions
//! - Any unknown token disables compression entirely (never partial)
//! - Stages are `io::Write` adaptors wrapping their successor, so a
//!   consumer always exists before its producer receives bytes
//! - Every chunk is flushed through so streaming bodies stay live

use std::io::{self, Write};

use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use tokio::sync::mpsc;

/// Brotli internal buffer size.
const BROTLI_BUFFER: usize = 4096;
/// Brotli quality (0-11); mid-range keeps streaming latency low.
const BROTLI_QUALITY: u32 = 5;
/// Brotli window size (log2).
const BROTLI_LGWIN: u32 = 22;

/// A content coding the writer can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Deflate,
    Brotli,
}

impl Encoding {
    /// Match a single, already-normalised coding token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gzip" | "x-gzip" => Some(Encoding::Gzip),
            "deflate" | "x-deflate" => Some(Encoding::Deflate),
            "br" => Some(Encoding::Brotli),
            _ => None,
        }
    }

    fn wrap(self, downstream: Box<dyn Stage>) -> Box<dyn Stage> {
        match self {
            Encoding::Gzip => Box::new(GzEncoder::new(downstream, Compression::default())),
            Encoding::Deflate => Box::new(ZlibEncoder::new(downstream, Compression::default())),
            Encoding::Brotli => Box::new(brotli::CompressorWriter::new(
                downstream,
                BROTLI_BUFFER,
                BROTLI_QUALITY,
                BROTLI_LGWIN,
            )),
        }
    }
}

/// Ordered list of encoders; `stages[0]` sees the raw body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionChain {
    stages: Vec<Encoding>,
}

impl CompressionChain {
    /// Build a chain from a `content-encoding` header value.
    ///
    /// Tokens are comma separated, trimmed and lower-cased. The first
    /// unrecognised token discards everything and yields an empty chain.
    pub fn from_header(content_encoding: Option<&str>) -> Self {
        let Some(value) = content_encoding else {
            return Self::default();
        };

        let mut stages = Vec::new();
        for token in value.split(',') {
            let token = token.trim().to_ascii_lowercase();
            match Encoding::from_token(&token) {
                Some(encoding) => stages.push(encoding),
                None => {
                    tracing::debug!(coding = %token, "Unknown content coding, leaving body as-is");
                    return Self::default();
                }
            }
        }
        Self { stages }
    }

    pub fn stages(&self) -> &[Encoding] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Wire the chain onto a fresh sink.
    ///
    /// The sink is created first, then the last encoder wraps it, then each
    /// predecessor wraps its successor. Returns the head of the pipe and the
    /// outlet receiving the final bytes.
    pub fn attach(&self) -> (Box<dyn Stage>, mpsc::UnboundedReceiver<Bytes>) {
        let (sink, outlet) = Sink::channel();
        let mut head: Box<dyn Stage> = Box::new(sink);
        for encoding in self.stages.iter().rev() {
            head = encoding.wrap(head);
        }
        (head, outlet)
    }
}

/// One link in the pipe: accepts bytes and knows how to finish itself and
/// everything downstream of it.
pub trait Stage: Write + Send {
    fn close(self: Box<Self>) -> io::Result<()>;
}

impl Stage for GzEncoder<Box<dyn Stage>> {
    fn close(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.close()
    }
}

impl Stage for ZlibEncoder<Box<dyn Stage>> {
    fn close(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.close()
    }
}

impl Stage for brotli::CompressorWriter<Box<dyn Stage>> {
    fn close(self: Box<Self>) -> io::Result<()> {
        // into_inner swallows write errors on the final block; a lost write
        // can only mean a closed outlet, which Sink::close reports.
        let mut this = *self;
        this.flush()?;
        this.into_inner().close()
    }
}

/// Tail of the pipe; hands finished bytes to the connection side.
pub struct Sink {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl Sink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response outlet closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Stage for Sink {
    fn close(self: Box<Self>) -> io::Result<()> {
        if self.tx.is_closed() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "response outlet closed"));
        }
        Ok(())
    }
}
