//! Async sniffer over Tokio transports.

use crate::error::{Error, Result};
use crate::sniffer::{SniffOutcome, DEFAULT_CHUNK_SIZE};
use std::io::ErrorKind;
use std::sync::Arc;
use tlsniff_core::{CertificateParser, Config, FeedStatus, HandshakeParser};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Async counterpart of [`Sniffer`](crate::Sniffer).
///
/// Only reads; the caller keeps ownership of the transport through
/// [`into_parts`](Self::into_parts) and decides what to forward.
#[derive(Debug)]
pub struct AsyncSniffer<R> {
    reader: R,
    parser: HandshakeParser,
    chunk_size: usize,
}

impl<R: AsyncRead + Unpin> AsyncSniffer<R> {
    /// Create a sniffer that keeps certificates as raw DER.
    pub fn new(reader: R, config: Config) -> Self {
        Self {
            reader,
            parser: HandshakeParser::new(config),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a sniffer that hands certificates to `parser`.
    pub fn with_certificate_parser(
        reader: R,
        config: Config,
        parser: Arc<dyn CertificateParser>,
    ) -> Self {
        Self {
            reader,
            parser: HandshakeParser::with_certificate_parser(config, parser),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set how many bytes to request per read (minimum 1).
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// The parser, for inspecting progress.
    pub fn parser(&self) -> &HandshakeParser {
        &self.parser
    }

    /// Read until the target state, end of input, or an error.
    ///
    /// Unlike [`Sniffer::run`](crate::Sniffer::run) this borrows, so the transport
    /// stays usable afterwards.
    pub async fn run(&mut self) -> Result<SniffOutcome> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = match self.reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            if n == 0 {
                tracing::debug!(state = %self.parser.state(), "end of input");
                self.parser.finish()?;
                return Ok(SniffOutcome::from_parser(&self.parser));
            }

            if self.parser.feed(&buf[..n])? == FeedStatus::Done {
                return Ok(SniffOutcome::from_parser(&self.parser));
            }
        }
    }

    /// Give back the reader and parser.
    pub fn into_parts(self) -> (R, HandshakeParser) {
        (self.reader, self.parser)
    }
}
