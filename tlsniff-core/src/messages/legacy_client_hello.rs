//! SSLv2-compatible ClientHello (RFC 5246 Appendix E.2).
//!
//! ```text
//! uint8 msg_type;              /* 1 */
//! Version version;
//! uint16 cipher_spec_length;   /* multiple of 3 */
//! uint16 session_id_length;
//! uint16 challenge_length;
//! V2CipherSpec cipher_specs[V2ClientHello.cipher_spec_length];
//! opaque session_id[V2ClientHello.session_id_length];
//! opaque challenge[V2ClientHello.challenge_length];
//! ```

use super::client_hello::{read_version, MAX_SESSION_ID_SIZE, RANDOM_SIZE};
use crate::cipher::{decode_legacy_cipher_specs, CipherSet};
use crate::error::{Error, Result};
use crate::protocol::{HandshakeType, ProtocolVersion};
use crate::tokenizer::Tokenizer;

/// Shortest challenge a client may send.
pub const MIN_CHALLENGE_SIZE: usize = 16;

/// Decoded SSLv2-compatible ClientHello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyClientHello {
    /// Highest version the client supports
    pub version: ProtocolVersion,

    /// Advertised ciphers (normalized where possible)
    pub cipher_suites: CipherSet,

    /// Session ID
    pub session_id: Vec<u8>,

    /// Challenge right-aligned into a 32-byte random
    pub random: [u8; RANDOM_SIZE],
}

impl LegacyClientHello {
    /// Decode an SSL 2.0 record body holding a ClientHello.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut tk = Tokenizer::new(body);

        let msg_type = tk.read_u8("sslv2.msg_type")?;
        if msg_type != HandshakeType::ClientHello.to_u8() {
            return Err(Error::unexpected(format!(
                "SSLv2 record carries message type {}",
                msg_type
            )));
        }

        let version = read_version(&mut tk, "sslv2.version")?;
        let cipher_spec_length = tk.read_u16("sslv2.cipher_spec_length")? as usize;
        let session_id_length = tk.read_u16("sslv2.session_id_length")? as usize;
        let challenge_length = tk.read_u16("sslv2.challenge_length")? as usize;

        if session_id_length > MAX_SESSION_ID_SIZE {
            return Err(Error::malformed(format!(
                "sslv2.session_id: {} bytes",
                session_id_length
            )));
        }
        if !(MIN_CHALLENGE_SIZE..=RANDOM_SIZE).contains(&challenge_length) {
            return Err(Error::malformed(format!(
                "sslv2.challenge: {} bytes",
                challenge_length
            )));
        }

        let mut cipher_suites = CipherSet::new();
        decode_legacy_cipher_specs(
            tk.read_bytes(cipher_spec_length, "sslv2.cipher_specs")?,
            &mut cipher_suites,
        )?;
        let session_id = tk.read_bytes(session_id_length, "sslv2.session_id")?.to_vec();
        let challenge = tk.read_bytes(challenge_length, "sslv2.challenge")?;
        tk.expect_end("SSLv2 ClientHello")?;

        let mut random = [0u8; RANDOM_SIZE];
        random[RANDOM_SIZE - challenge.len()..].copy_from_slice(challenge);

        Ok(Self {
            version,
            cipher_suites,
            session_id,
            random,
        })
    }
}
