//! # TLSniff Core
//!
//! Incremental, read-only TLS handshake parser for intercepting proxies.
//!
//! The parser is fed the bytes of one direction of a connection as they arrive and
//! extracts negotiation metadata without taking part in the handshake:
//! - Record framing, including the SSLv2-compatible ClientHello
//! - ClientHello / ServerHello decoding (version, random, session ID, ciphers)
//! - Extension decoding (SNI, ALPN, session ticket, heartbeat, status request)
//! - Certificate chain extraction through a pluggable [`CertificateParser`]
//! - Session resumption signals
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Public API (tlsniff)               │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │      tlsniff-core (this crate)          │
//! │  ┌──────────────────────────────────┐   │
//! │  │   HandshakeParser (feed)         │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Hello / Extension / Cipher /   │   │
//! │  │   Certificate decoders           │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record framing                 │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Tokenizer                      │   │
//! │  └──────────────────────────────────┘   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   CertificateParser (tlsniff-x509)      │
//! └─────────────────────────────────────────┘
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]

// Core modules
pub mod certificate;
pub mod cipher;
pub mod error;
pub mod extensions;
pub mod messages;
pub mod parser;
pub mod protocol;
pub mod record;
pub mod state;
pub mod summary;
pub mod tokenizer;
pub mod x509_simple;

// Re-exports
pub use certificate::{CertificateChain, CertificateParser, ChainEntry, ParsedCertificate};
pub use cipher::{CipherId, CipherSet};
pub use error::{Error, Result};
pub use parser::HandshakeParser;
pub use protocol::{ContentType, ProtocolVersion};
pub use state::{FeedStatus, ParseState};
pub use summary::HandshakeSummary;

/// Largest value a 24-bit handshake length can hold.
pub const MAX_HANDSHAKE_LENGTH: usize = 0xFF_FFFF;

/// Handshake inspection configuration.
///
/// # Example
///
/// ```rust
/// use tlsniff_core::{Config, ParseState};
///
/// let config = Config::builder()
///     .with_target_state(ParseState::CertificatesReceived)
///     .with_legacy_framing(false)
///     .build()
///     .unwrap();
/// assert!(!config.detect_legacy_framing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Recognize an SSLv2-compatible first record (default: true)
    pub detect_legacy_framing: bool,

    /// Require the null compression method in a ClientHello (default: false)
    pub strict_compression: bool,

    /// State at which [`HandshakeParser::feed`] reports done
    pub target_state: ParseState,

    /// Report done right after a ClientHello (default: true)
    pub stop_after_client_hello: bool,

    /// Largest handshake message accepted (default: 256 KiB)
    pub max_message_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detect_legacy_framing: true,
            strict_compression: false,
            target_state: ParseState::HelloDoneReceived,
            stop_after_client_hello: true,
            max_message_size: 256 * 1024,
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Configuration builder.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable SSLv2-compatible framing detection.
    pub fn with_legacy_framing(mut self, enable: bool) -> Self {
        self.config.detect_legacy_framing = enable;
        self
    }

    /// Treat a missing null compression method as malformed.
    pub fn with_strict_compression(mut self, strict: bool) -> Self {
        self.config.strict_compression = strict;
        self
    }

    /// Set the state at which parsing is done.
    pub fn with_target_state(mut self, state: ParseState) -> Self {
        self.config.target_state = state;
        self
    }

    /// Whether a ClientHello alone is enough.
    pub fn with_stop_after_client_hello(mut self, stop: bool) -> Self {
        self.config.stop_after_client_hello = stop;
        self
    }

    /// Set the largest accepted handshake message.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<Config> {
        if self.config.target_state == ParseState::NoHello {
            return Err(Error::InvalidConfig(
                "target state must be past NoHello".into(),
            ));
        }

        if self.config.max_message_size == 0 {
            return Err(Error::InvalidConfig("max message size is zero".into()));
        }

        if self.config.max_message_size > MAX_HANDSHAKE_LENGTH {
            return Err(Error::InvalidConfig(
                "max message size exceeds the 24-bit length field".into(),
            ));
        }

        Ok(self.config)
    }
}
