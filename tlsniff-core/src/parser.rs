//! Incremental handshake parser.
//!
//! [`HandshakeParser`] is fed the bytes of one direction of a TLS connection in
//! whatever chunks the network delivers. It frames records, reassembles handshake
//! messages that span records, and fills in a [`HandshakeSummary`].
//!
//! # Commit points
//!
//! Bytes leave the accumulation buffer one whole record at a time. A record that has
//! not fully arrived is left in place and framed again from its first byte by the next
//! [`feed`](HandshakeParser::feed). Record payloads move into a handshake fragment
//! buffer, from which whole messages are taken once their declared length is
//! available. Nothing is parsed twice.
//!
//! # Example
//!
//! ```rust
//! use tlsniff_core::{Config, FeedStatus, HandshakeParser, ParseState};
//!
//! let mut parser = HandshakeParser::new(Config::default());
//! // First half of a record header: not enough to do anything yet
//! assert_eq!(parser.feed(&[0x16, 0x03]).unwrap(), FeedStatus::Incomplete);
//! assert_eq!(parser.state(), ParseState::HelloStarted);
//! assert_eq!(parser.unparsed(), &[0x16, 0x03]);
//! ```

use crate::certificate::{decode_certificate_list, CertificateChain, CertificateParser};
use crate::error::{Error, ParseError, Result};
use crate::messages::{ClientHello, LegacyClientHello, ServerHello};
use crate::protocol::{ContentType, HandshakeType, ProtocolVersion};
use crate::record::{detect_framing, read_legacy_record, read_record, RecordFraming};
use crate::state::{FeedStatus, ParseState};
use crate::summary::HandshakeSummary;
use crate::tokenizer::{ParseResult, Tokenizer};
use crate::Config;
use bytes::{Buf, Bytes, BytesMut};
use std::sync::Arc;

/// Handshake message header size: type(1) + length(3).
pub const HANDSHAKE_HEADER_SIZE: usize = 4;

/// Alert level for fatal alerts.
const ALERT_LEVEL_FATAL: u8 = 2;

/// Read-only parser for one direction of a TLS handshake.
///
/// One instance per connection direction; it is not meant to be shared.
#[derive(Debug)]
pub struct HandshakeParser {
    config: Config,
    certificate_parser: Option<Arc<dyn CertificateParser>>,

    /// Received bytes not yet committed
    buffer: BytesMut,
    /// Committed bytes
    consumed: u64,
    /// `None` until the first record's framing is known
    framing: Option<RecordFraming>,

    /// Record payload framed but not yet decoded as whole messages
    fragments: BytesMut,
    last_content_type: Option<ContentType>,

    state: ParseState,
    done: Option<&'static str>,
    error: Option<Error>,

    /// Which Hello this stream started with
    hello: Option<HandshakeType>,
    summary: HandshakeSummary,
    certificates: Option<CertificateChain>,
    resuming: bool,
}

impl HandshakeParser {
    /// Create a parser that keeps certificates as raw DER.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            certificate_parser: None,
            buffer: BytesMut::new(),
            consumed: 0,
            framing: None,
            fragments: BytesMut::new(),
            last_content_type: None,
            state: ParseState::NoHello,
            done: None,
            error: None,
            hello: None,
            summary: HandshakeSummary::new(),
            certificates: None,
            resuming: false,
        }
    }

    /// Create a parser that hands every certificate to `parser`.
    pub fn with_certificate_parser(config: Config, parser: Arc<dyn CertificateParser>) -> Self {
        let mut this = Self::new(config);
        this.certificate_parser = Some(parser);
        this
    }

    /// Append received bytes and parse as far as they allow.
    ///
    /// Returns [`FeedStatus::Done`] once the configured target state has been
    /// reached; bytes past that point are kept in [`unparsed`](Self::unparsed).
    /// Errors are sticky: after the first one every call returns it again.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<FeedStatus> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        if self.done.is_some() {
            if self.state.is_terminal() && !bytes.is_empty() {
                return Err(self.fail(Error::PostHandshakeData));
            }
            self.buffer.extend_from_slice(bytes);
            return Ok(FeedStatus::Done);
        }

        self.buffer.extend_from_slice(bytes);
        match self.advance() {
            Ok(()) if self.done.is_some() => Ok(FeedStatus::Done),
            Ok(()) => Ok(FeedStatus::Incomplete),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Declare that no more bytes will arrive.
    ///
    /// Fails with [`Error::Truncated`] unless the target state was reached.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.done.is_some() {
            return Ok(());
        }

        let err = Error::Truncated {
            state: self.state,
            pending: self.buffer.len() + self.fragments.len(),
        };
        Err(self.fail(err))
    }

    /// Current parse state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Check whether the target state was reached.
    pub fn is_done(&self) -> bool {
        self.done.is_some()
    }

    /// What satisfied the target, once done.
    pub fn done_reason(&self) -> Option<&'static str> {
        self.done
    }

    /// Metadata extracted so far.
    pub fn summary(&self) -> &HandshakeSummary {
        &self.summary
    }

    /// Certificate chain, once a Certificate message was decoded.
    pub fn certificates(&self) -> Option<&CertificateChain> {
        self.certificates.as_ref()
    }

    /// Check whether session resumption was observed.
    pub fn is_resuming(&self) -> bool {
        self.resuming
    }

    /// Received bytes that have not been committed.
    pub fn unparsed(&self) -> &[u8] {
        &self.buffer
    }

    /// Committed record payload not yet decoded as whole messages.
    ///
    /// Non-empty after [`Done`](FeedStatus::Done) when the target was reached partway
    /// through a record: the remaining handshake messages of that record wait here,
    /// without their record headers.
    pub fn pending_fragments(&self) -> &[u8] {
        &self.fragments
    }

    /// Total bytes committed.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// The first fatal error, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Parser configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::warn!(state = %self.state, error = %err, "handshake inspection failed");
        self.error = Some(err.clone());
        err
    }

    fn advance(&mut self) -> Result<()> {
        if self.state == ParseState::NoHello && !self.buffer.is_empty() {
            self.set_state(ParseState::HelloStarted);
            self.update_done();
        }

        while self.done.is_none() {
            let progressed = match self.framing {
                None => self.decide_framing(),
                Some(RecordFraming::Modern) => self.parse_record()?,
                Some(legacy) => self.parse_legacy_record(legacy)?,
            };
            if !progressed {
                break;
            }
        }
        Ok(())
    }

    fn decide_framing(&mut self) -> bool {
        let framing = if self.config.detect_legacy_framing {
            match detect_framing(&self.buffer) {
                Some(framing) => framing,
                None => return false,
            }
        } else {
            RecordFraming::Modern
        };

        if framing.is_legacy() {
            tracing::debug!(?framing, "SSLv2-compatible record framing");
        }
        self.framing = Some(framing);
        true
    }

    fn parse_legacy_record(&mut self, framing: RecordFraming) -> Result<bool> {
        self.check_transition(ParseState::HelloReceived, "SSLv2 ClientHello")?;

        let mut tk = Tokenizer::streaming(&self.buffer);
        let body = match read_legacy_record(&mut tk, framing) {
            Ok(body) => body,
            Err(ParseError::Underrun) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let hello = LegacyClientHello::decode(body)?;
        let total = tk.offset();
        self.commit(total);
        self.framing = Some(RecordFraming::Modern);

        let summary = &mut self.summary;
        summary.record_version = Some(ProtocolVersion::Ssl20);
        summary.hello_version = Some(hello.version);
        summary.client_random = hello.random.to_vec();
        summary.ciphers.extend(hello.cipher_suites);
        summary.session_id = hello.session_id;
        if !summary.session_id.is_empty() {
            self.resuming = true;
        }

        tracing::debug!(
            version = %hello.version,
            ciphers = self.summary.ciphers.len(),
            "SSLv2 ClientHello"
        );
        self.hello = Some(HandshakeType::ClientHello);
        self.set_state(ParseState::HelloReceived);
        if self.config.stop_after_client_hello {
            self.mark_done("ClientHello");
        }
        Ok(true)
    }

    fn parse_record(&mut self) -> Result<bool> {
        let protected = self.state >= ParseState::ChangeCipherSpecReceived;

        let mut tk = Tokenizer::streaming(&self.buffer);
        let (content_type, version, length) = match read_record(&mut tk, protected) {
            Ok(record) => (record.content_type, record.version, record.fragment.len()),
            Err(ParseError::Underrun) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let total = tk.offset();

        let mut payload = self.commit(total);
        payload.advance(total - length);
        self.summary.record_version = Some(version);

        self.handle_record(content_type, payload.freeze())?;
        Ok(true)
    }

    fn commit(&mut self, n: usize) -> BytesMut {
        self.consumed += n as u64;
        self.buffer.split_to(n)
    }

    fn handle_record(&mut self, content_type: ContentType, payload: Bytes) -> Result<()> {
        if let Some(last) = self.last_content_type {
            if last != content_type && !self.fragments.is_empty() {
                return Err(Error::malformed(format!(
                    "{} record interleaved with an unfinished {} message",
                    content_type.name(),
                    last.name()
                )));
            }
        }
        self.last_content_type = Some(content_type);

        match content_type {
            ContentType::Handshake if self.state == ParseState::ChangeCipherSpecReceived => {
                // Encrypted Finished
                self.check_transition(ParseState::FinishReceived, "Finished")?;
                tracing::trace!(length = payload.len(), "skipping encrypted Finished");
                self.set_state(ParseState::FinishReceived);
            },
            ContentType::Handshake => {
                self.fragments.extend_from_slice(&payload);
                self.parse_messages()?;
            },
            ContentType::ChangeCipherSpec => self.handle_change_cipher_spec(&payload)?,
            ContentType::Alert => self.handle_alert(&payload)?,
            ContentType::ApplicationData => return Err(Error::ApplicationDataBeforeFinished),
            ContentType::Heartbeat => {
                tracing::trace!(length = payload.len(), "skipping heartbeat record");
            },
        }

        self.update_done();
        Ok(())
    }

    fn handle_change_cipher_spec(&mut self, payload: &[u8]) -> Result<()> {
        if payload != [1] {
            return Err(Error::malformed(format!(
                "ChangeCipherSpec: unexpected body {:02x?}",
                payload
            )));
        }
        self.check_transition(ParseState::ChangeCipherSpecReceived, "ChangeCipherSpec")?;

        // A server that switches ciphers before ServerHelloDone is resuming
        if self.hello == Some(HandshakeType::ServerHello)
            && self.state < ParseState::HelloDoneReceived
        {
            tracing::debug!("abbreviated handshake");
            self.resuming = true;
        }
        self.set_state(ParseState::ChangeCipherSpecReceived);
        Ok(())
    }

    fn handle_alert(&mut self, payload: &[u8]) -> Result<()> {
        if self.state >= ParseState::ChangeCipherSpecReceived {
            tracing::trace!(length = payload.len(), "skipping encrypted alert");
            return Ok(());
        }

        // Alerts may be fragmented like any other content type
        self.fragments.extend_from_slice(payload);
        let whole = self.fragments.len() - self.fragments.len() % 2;
        let alerts = self.fragments.split_to(whole);
        for alert in alerts.chunks_exact(2) {
            let (level, description) = (alert[0], alert[1]);
            if level == ALERT_LEVEL_FATAL {
                tracing::warn!(description, "peer sent fatal alert");
            } else {
                tracing::debug!(level, description, "peer sent alert");
            }
        }
        Ok(())
    }

    fn parse_messages(&mut self) -> Result<()> {
        while self.done.is_none() {
            let (msg_type, length) =
                match peek_message(&self.fragments, self.config.max_message_size) {
                    Ok(header) => header,
                    Err(ParseError::Underrun) => break,
                    Err(e) => return Err(e.into()),
                };

            let mut message = self.fragments.split_to(HANDSHAKE_HEADER_SIZE + length);
            message.advance(HANDSHAKE_HEADER_SIZE);
            self.handle_message(msg_type, &message)?;
            self.update_done();
        }
        Ok(())
    }

    fn handle_message(&mut self, msg_type: u8, body: &[u8]) -> Result<()> {
        let Some(kind) = HandshakeType::from_u8(msg_type) else {
            tracing::trace!(msg_type, length = body.len(), "skipping handshake message");
            return Ok(());
        };
        tracing::trace!(?kind, length = body.len(), "handshake message");

        match kind {
            HandshakeType::ClientHello => {
                self.check_transition(ParseState::HelloReceived, "ClientHello")?;
                let hello = ClientHello::decode(body, self.config.strict_compression)?;
                self.apply_client_hello(hello);
                self.set_state(ParseState::HelloReceived);
                if self.config.stop_after_client_hello {
                    self.mark_done("ClientHello");
                }
            },
            HandshakeType::ServerHello => {
                self.check_transition(ParseState::HelloReceived, "ServerHello")?;
                let hello = ServerHello::decode(body)?;
                self.apply_server_hello(hello);
                self.set_state(ParseState::HelloReceived);
            },
            HandshakeType::Certificate => {
                self.check_transition(ParseState::CertificatesReceived, "Certificate")?;
                let chain = decode_certificate_list(body, self.certificate_parser.as_deref())?;
                self.certificates = Some(chain);
                self.set_state(ParseState::CertificatesReceived);
            },
            HandshakeType::ServerHelloDone => {
                self.check_transition(ParseState::HelloDoneReceived, "ServerHelloDone")?;
                if !body.is_empty() {
                    return Err(Error::malformed(format!(
                        "ServerHelloDone: {} byte body",
                        body.len()
                    )));
                }
                self.set_state(ParseState::HelloDoneReceived);
            },
            HandshakeType::NewSessionTicket => {
                self.check_transition(ParseState::TicketReceived, "NewSessionTicket")?;
                self.resuming = true;
                self.set_state(ParseState::TicketReceived);
            },
            HandshakeType::Finished => {
                self.check_transition(ParseState::FinishReceived, "Finished")?;
                self.set_state(ParseState::FinishReceived);
            },
        }
        Ok(())
    }

    fn apply_client_hello(&mut self, hello: ClientHello) {
        let summary = &mut self.summary;
        summary.hello_version = Some(hello.version);
        summary.client_random = hello.random.to_vec();
        summary.session_id = hello.session_id;
        summary.ciphers.extend(hello.cipher_suites);
        summary.compression_supported = hello.compression_supported;
        if let Some(exts) = &hello.extensions {
            summary.apply_extensions(exts);
        }

        if !summary.session_id.is_empty() || summary.session_ticket_extension {
            self.resuming = true;
        }
        self.hello = Some(HandshakeType::ClientHello);

        tracing::debug!(
            version = %hello.version,
            sni = self.summary.sni(),
            alpn = self.summary.alpn.as_deref().unwrap_or(""),
            ciphers = self.summary.ciphers.len(),
            "ClientHello"
        );
    }

    fn apply_server_hello(&mut self, hello: ServerHello) {
        let summary = &mut self.summary;
        summary.hello_version = Some(hello.version);
        summary.server_random = hello.random.to_vec();
        summary.session_id = hello.session_id;
        summary.ciphers.insert(hello.cipher_suite);
        summary.compression_supported = hello.compression_method != 0;
        if let Some(exts) = &hello.extensions {
            summary.apply_extensions(exts);
        }
        self.hello = Some(HandshakeType::ServerHello);

        tracing::debug!(
            version = %hello.version,
            cipher = ?hello.cipher_suite,
            alpn = self.summary.alpn.as_deref().unwrap_or(""),
            "ServerHello"
        );
    }

    /// Reject messages that would move the state backwards, or that need a Hello first.
    fn check_transition(&self, to: ParseState, what: &str) -> Result<()> {
        if self.state >= to {
            return Err(Error::unexpected(format!("{} in state {}", what, self.state)));
        }
        if to > ParseState::HelloReceived && self.state < ParseState::HelloReceived {
            return Err(Error::unexpected(format!("{} before any Hello", what)));
        }
        Ok(())
    }

    fn set_state(&mut self, to: ParseState) {
        tracing::debug!(from = %self.state, to = %to, "parse state");
        self.state = to;
    }

    fn mark_done(&mut self, reason: &'static str) {
        if self.done.is_none() {
            tracing::debug!(reason, consumed = self.consumed, "handshake inspection done");
            self.done = Some(reason);
        }
    }

    fn update_done(&mut self) {
        if self.state >= self.config.target_state {
            self.mark_done(self.state.name());
        }
    }
}

/// Frame one handshake message header, requiring the whole body to be present.
fn peek_message(fragments: &[u8], max_message_size: usize) -> ParseResult<(u8, usize)> {
    let mut tk = Tokenizer::streaming(fragments);
    let msg_type = tk.read_u8("handshake.msg_type")?;
    let length = tk.read_u24("handshake.length")? as usize;
    if length > max_message_size {
        return Err(ParseError::Malformed(format!(
            "handshake.length: {} exceeds {}",
            length, max_message_size
        )));
    }
    tk.skip(length, "handshake.body")?;
    Ok((msg_type, length))
}
