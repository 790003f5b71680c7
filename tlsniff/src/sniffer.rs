//! Blocking sniffer over any [`Read`] source.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use tlsniff_core::{
    CertificateChain, CertificateParser, Config, FeedStatus, HandshakeParser, HandshakeSummary,
    ParseState,
};

/// Default read size.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// What a completed sniffing run observed.
#[derive(Debug, Clone)]
pub struct SniffOutcome {
    /// Extracted metadata
    pub summary: HandshakeSummary,

    /// State reached
    pub state: ParseState,

    /// Certificate chain, if one was sent before the target state
    pub certificates: Option<CertificateChain>,

    /// Session resumption was observed
    pub resuming: bool,

    /// Bytes read past the target state, in order
    pub trailing: Bytes,

    /// Handshake messages left in the record that reached the target state,
    /// without record headers. They precede `trailing` on the wire.
    pub pending_fragments: Bytes,
}

impl SniffOutcome {
    pub(crate) fn from_parser(parser: &HandshakeParser) -> Self {
        Self {
            summary: parser.summary().clone(),
            state: parser.state(),
            certificates: parser.certificates().cloned(),
            resuming: parser.is_resuming(),
            trailing: Bytes::copy_from_slice(parser.unparsed()),
            pending_fragments: Bytes::copy_from_slice(parser.pending_fragments()),
        }
    }
}

/// Reads from a transport into a [`HandshakeParser`] until the target state is reached.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use tlsniff::{Config, Sniffer};
///
/// // Not TLS: the run fails instead of waiting for more bytes
/// let sniffer = Sniffer::new(Cursor::new(b"SSH-2.0-OpenSSH_9.6\r\n".to_vec()), Config::default());
/// assert!(sniffer.run().is_err());
/// ```
#[derive(Debug)]
pub struct Sniffer<R> {
    reader: R,
    parser: HandshakeParser,
    chunk_size: usize,
}

impl<R: Read> Sniffer<R> {
    /// Create a sniffer that keeps certificates as raw DER.
    pub fn new(reader: R, config: Config) -> Self {
        Self::with_parser(reader, HandshakeParser::new(config))
    }

    /// Create a sniffer that hands certificates to `parser`.
    pub fn with_certificate_parser(
        reader: R,
        config: Config,
        parser: Arc<dyn CertificateParser>,
    ) -> Self {
        Self::with_parser(reader, HandshakeParser::with_certificate_parser(config, parser))
    }

    /// Create a sniffer that decodes certificates with `x509-parser`.
    #[cfg(feature = "x509")]
    pub fn with_x509(reader: R, config: Config) -> Self {
        Self::with_certificate_parser(
            reader,
            config,
            Arc::new(tlsniff_x509::X509CertificateParser::new()),
        )
    }

    fn with_parser(reader: R, parser: HandshakeParser) -> Self {
        Self {
            reader,
            parser,
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
    /// End of input before the target state is [`tlsniff_core::Error::Truncated`].
    pub fn run(mut self) -> Result<SniffOutcome> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = match self.reader.read(&mut buf) {
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
