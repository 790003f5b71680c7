//! ServerHello message (RFC 5246 Section 7.4.1.3).

use super::client_hello::{read_session_id, read_version, RANDOM_SIZE};
use crate::cipher::CipherId;
use crate::error::Result;
use crate::extensions::HelloExtensions;
use crate::protocol::ProtocolVersion;
use crate::tokenizer::Tokenizer;

/// Decoded ServerHello.
///
/// ```text
/// struct {
///     ProtocolVersion server_version;
///     Random random;
///     SessionID session_id;
///     CipherSuite cipher_suite;
///     CompressionMethod compression_method;
///     select (extensions_present) {
///         case false: struct {};
///         case true:  Extension extensions<0..2^16-1>;
///     };
/// } ServerHello;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Selected version
    pub version: ProtocolVersion,

    /// Server random
    pub random: [u8; RANDOM_SIZE],

    /// Session ID
    pub session_id: Vec<u8>,

    /// Selected cipher suite
    pub cipher_suite: CipherId,

    /// Selected compression method
    pub compression_method: u8,

    /// Extensions, when present
    pub extensions: Option<HelloExtensions>,
}

impl ServerHello {
    /// Decode a ServerHello body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut tk = Tokenizer::new(body);

        let version = read_version(&mut tk, "server_version")?;
        let random = tk.read_array("random")?;
        let session_id = read_session_id(&mut tk)?;
        let cipher_suite = CipherId::Suite(tk.read_u16("cipher_suite")?);
        let compression_method = tk.read_u8("compression_method")?;

        let extensions = if tk.at_end() {
            None
        } else {
            let raw = tk.read_u16_prefixed("extensions")?;
            tk.expect_end("ServerHello")?;
            Some(HelloExtensions::decode(raw)?)
        };

        Ok(Self {
            version,
            random,
            session_id,
            cipher_suite,
            compression_method,
            extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut body = vec![0x03, 0x01];
        body.extend_from_slice(&[0x22; 32]);
        body.push(0x00);
        body.extend_from_slice(&[0xC0, 0x2F, 0x00]);
        body.extend_from_slice(&[0x00, 0x04, 0x00, 0x23, 0x00, 0x00]);

        let hello = ServerHello::decode(&body).unwrap();
        assert_eq!(hello.version, ProtocolVersion::Tls10);
        assert!(hello.session_id.is_empty());
        assert_eq!(hello.cipher_suite, CipherId::Suite(0xC02F));
        assert_eq!(hello.compression_method, 0);
        assert!(hello.extensions.unwrap().session_ticket);
    }

    #[test]
    fn test_missing_cipher_suite() {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0x22; 32]);
        body.push(0x00);
        body.push(0xC0);
        assert!(ServerHello::decode(&body).is_err());
    }
}
