//! ClientHello message (RFC 5246 Section 7.4.1.2).

use crate::cipher::{decode_cipher_suites, decode_compression_methods, CipherSet};
use crate::error::{Error, Result};
use crate::extensions::HelloExtensions;
use crate::protocol::ProtocolVersion;
use crate::tokenizer::Tokenizer;

/// Size of the hello random.
pub const RANDOM_SIZE: usize = 32;

/// Longest legal session identifier.
pub const MAX_SESSION_ID_SIZE: usize = 32;

/// Decoded ClientHello.
///
/// ```text
/// struct {
///     ProtocolVersion client_version;
///     Random random;
///     SessionID session_id;
///     CipherSuite cipher_suites<2..2^16-2>;
///     CompressionMethod compression_methods<1..2^8-1>;
///     select (extensions_present) {
///         case false: struct {};
///         case true:  Extension extensions<0..2^16-1>;
///     };
/// } ClientHello;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Client version
    pub version: ProtocolVersion,

    /// Client random
    pub random: [u8; RANDOM_SIZE],

    /// Session ID offered for resumption (may be empty)
    pub session_id: Vec<u8>,

    /// Offered cipher suites
    pub cipher_suites: CipherSet,

    /// A non-null compression method was offered
    pub compression_supported: bool,

    /// Extensions, when present
    pub extensions: Option<HelloExtensions>,
}

impl ClientHello {
    /// Decode a ClientHello body.
    pub fn decode(body: &[u8], strict_compression: bool) -> Result<Self> {
        let mut tk = Tokenizer::new(body);

        let version = read_version(&mut tk, "client_version")?;
        let random = tk.read_array("random")?;
        let session_id = read_session_id(&mut tk)?;

        let mut cipher_suites = CipherSet::new();
        decode_cipher_suites(tk.read_u16_prefixed("cipher_suites")?, &mut cipher_suites)?;

        let compression_supported = decode_compression_methods(
            tk.read_u8_prefixed("compression_methods")?,
            strict_compression,
        )?;

        let extensions = if tk.at_end() {
            None
        } else {
            let raw = tk.read_u16_prefixed("extensions")?;
            tk.expect_end("ClientHello")?;
            Some(HelloExtensions::decode(raw)?)
        };

        Ok(Self {
            version,
            random,
            session_id,
            cipher_suites,
            compression_supported,
            extensions,
        })
    }
}

pub(crate) fn read_version(tk: &mut Tokenizer<'_>, what: &str) -> Result<ProtocolVersion> {
    let major = tk.read_u8(what)?;
    let minor = tk.read_u8(what)?;
    ProtocolVersion::from_wire(major, minor).ok_or_else(|| {
        Error::malformed(format!(
            "{}: {:#04x}{:02x} is not an SSL/TLS version",
            what, major, minor
        ))
    })
}

pub(crate) fn read_session_id(tk: &mut Tokenizer<'_>) -> Result<Vec<u8>> {
    let session_id = tk.read_u8_prefixed("session_id")?;
    if session_id.len() > MAX_SESSION_ID_SIZE {
        return Err(Error::malformed(format!(
            "session_id: {} bytes",
            session_id.len()
        )));
    }
    Ok(session_id.to_vec())
}
