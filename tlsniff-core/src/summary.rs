//! Negotiation metadata collected while parsing.

use crate::cipher::{CipherId, CipherSet};
use crate::extensions::HelloExtensions;
use crate::protocol::ProtocolVersion;
use core::fmt;

/// Metadata extracted from the handshake.
///
/// Created empty with the parser and filled in as messages are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeSummary {
    /// Version of the most recent record (what the peer framed with)
    pub record_version: Option<ProtocolVersion>,

    /// Version carried inside the Hello message
    pub hello_version: Option<ProtocolVersion>,

    /// A non-null compression method was offered or selected
    pub compression_supported: bool,

    /// Server name indication, if present
    pub server_name: Option<String>,

    /// heartbeat extension present
    pub heartbeats: bool,

    /// session_ticket extension present
    pub session_ticket_extension: bool,

    /// session_ticket extension carries a ticket
    pub has_session_ticket: bool,

    /// status_request extension present
    pub status_request: bool,

    /// Extensions outside the recognized set were seen
    pub unsupported_extensions: bool,

    /// First ALPN protocol name, if present
    pub alpn: Option<String>,

    /// Client random (32 bytes; SSLv2 challenges are right-aligned)
    pub client_random: Vec<u8>,

    /// Server random
    pub server_random: Vec<u8>,

    /// Session identifier
    pub session_id: Vec<u8>,

    /// Advertised (client) or selected (server) cipher identifiers
    pub ciphers: CipherSet,
}

impl HandshakeSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The SNI host name, or `""` when the extension was absent.
    pub fn sni(&self) -> &str {
        self.server_name.as_deref().unwrap_or("")
    }

    /// Check whether a cipher identifier was seen.
    pub fn has_cipher(&self, id: impl Into<CipherId>) -> bool {
        self.ciphers.contains(&id.into())
    }

    pub(crate) fn apply_extensions(&mut self, exts: &HelloExtensions) {
        if let Some(name) = &exts.server_name {
            self.server_name = Some(name.clone());
        }
        if let Some(alpn) = &exts.alpn {
            self.alpn = Some(alpn.clone());
        }
        self.session_ticket_extension |= exts.session_ticket;
        self.has_session_ticket |= exts.has_ticket;
        self.heartbeats |= exts.heartbeat;
        self.status_request |= exts.status_request;
        self.unsupported_extensions |= exts.unsupported;
    }
}

impl fmt::Display for HandshakeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(v) = self.record_version {
            write!(f, "record version: {}; ", v)?;
        }
        if let Some(v) = self.hello_version {
            write!(f, "hello version: {}; ", v)?;
        }
        write!(f, "compression: {}; ", self.compression_supported)?;
        if let Some(name) = &self.server_name {
            write!(f, "SNI: {}; ", name)?;
        }
        if let Some(alpn) = &self.alpn {
            write!(f, "ALPN: {}; ", alpn)?;
        }
        write!(
            f,
            "ticket ext: {}; ticket: {}; heartbeats: {}; status request: {}; unsupported extensions: {}; ",
            self.session_ticket_extension,
            self.has_session_ticket,
            self.heartbeats,
            self.status_request,
            self.unsupported_extensions
        )?;
        write!(f, "ciphers: {}", self.ciphers.len())
    }
}
