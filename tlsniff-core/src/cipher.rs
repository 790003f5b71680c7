//! Cipher suite and compression method vectors.
//!
//! Modern hellos list 16-bit cipher suite identifiers. The SSLv2-compatible
//! ClientHello lists 3-byte "cipher specs"; those whose leading byte is zero are
//! ordinary TLS suites, the rest are SSL 2.0 cipher kinds with no modern equivalent.

use crate::error::{Error, Result};
use crate::tokenizer::Tokenizer;
use std::collections::BTreeSet;

/// Set of advertised cipher identifiers. Order is not significant.
pub type CipherSet = BTreeSet<CipherId>;

/// A cipher identifier as advertised on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CipherId {
    /// A TLS cipher suite (16-bit identifier)
    Suite(u16),

    /// An SSL 2.0 cipher kind (24-bit identifier with a non-zero leading byte)
    LegacyOnly(u32),
}

impl CipherId {
    /// TLS_RSA_WITH_RC4_128_MD5
    pub const TLS_RSA_WITH_RC4_128_MD5: Self = Self::Suite(0x0004);
    /// TLS_RSA_WITH_AES_128_CBC_SHA
    pub const TLS_RSA_WITH_AES_128_CBC_SHA: Self = Self::Suite(0x002F);
    /// TLS_RSA_WITH_AES_256_CBC_SHA
    pub const TLS_RSA_WITH_AES_256_CBC_SHA: Self = Self::Suite(0x0035);
    /// TLS_EMPTY_RENEGOTIATION_INFO_SCSV
    pub const TLS_EMPTY_RENEGOTIATION_INFO_SCSV: Self = Self::Suite(0x00FF);
    /// TLS_AES_128_GCM_SHA256
    pub const TLS_AES_128_GCM_SHA256: Self = Self::Suite(0x1301);
    /// TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256
    pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: Self = Self::Suite(0xC02F);

    /// Normalize a 3-byte SSLv2 cipher spec.
    pub const fn from_legacy_spec(spec: [u8; 3]) -> Self {
        let value = ((spec[0] as u32) << 16) | ((spec[1] as u32) << 8) | spec[2] as u32;
        if spec[0] == 0 {
            CipherId::Suite(value as u16)
        } else {
            CipherId::LegacyOnly(value)
        }
    }

    /// The 16-bit suite identifier, if this is a TLS suite.
    pub const fn suite(self) -> Option<u16> {
        match self {
            CipherId::Suite(id) => Some(id),
            CipherId::LegacyOnly(_) => None,
        }
    }

    /// Check if this is a signaling value rather than a real suite.
    pub const fn is_signaling(self) -> bool {
        matches!(self, CipherId::Suite(0x00FF) | CipherId::Suite(0x5600))
    }
}

impl From<u16> for CipherId {
    fn from(id: u16) -> Self {
        CipherId::Suite(id)
    }
}

/// Decode the body of a `CipherSuite cipher_suites<2..2^16-2>` vector.
pub fn decode_cipher_suites(raw: &[u8], ciphers: &mut CipherSet) -> Result<()> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return Err(Error::malformed(format!(
            "cipher_suites: invalid length {}",
            raw.len()
        )));
    }

    let mut tk = Tokenizer::new(raw);
    while !tk.at_end() {
        ciphers.insert(CipherId::Suite(tk.read_u16("cipher_suite")?));
    }
    Ok(())
}

/// Decode the body of an SSLv2 `cipher_specs` area (3 bytes per entry).
pub fn decode_legacy_cipher_specs(raw: &[u8], ciphers: &mut CipherSet) -> Result<()> {
    if raw.len() % 3 != 0 {
        return Err(Error::malformed(format!(
            "cipher_specs: length {} is not a multiple of 3",
            raw.len()
        )));
    }

    let mut tk = Tokenizer::new(raw);
    while !tk.at_end() {
        let spec: [u8; 3] = tk.read_array("cipher_spec")?;
        ciphers.insert(CipherId::from_legacy_spec(spec));
    }
    Ok(())
}

/// Decode the body of a `CompressionMethod compression_methods<1..2^8-1>` vector.
///
/// Returns whether any real compression method (non-null) was offered. In strict
/// mode the mandatory null method must be present.
pub fn decode_compression_methods(raw: &[u8], strict: bool) -> Result<bool> {
    if raw.is_empty() {
        return Err(Error::malformed("compression_methods: empty vector"));
    }

    let has_null = raw.contains(&0);
    if strict && !has_null {
        return Err(Error::malformed(
            "compression_methods: null method missing",
        ));
    }

    Ok(raw.iter().any(|&method| method != 0))
}
