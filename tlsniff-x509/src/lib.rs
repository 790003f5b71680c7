//! # x509-parser Certificate Backend for TLSniff
//!
//! This crate provides a [`CertificateParser`] for tlsniff using the
//! [x509-parser](https://github.com/rusticata/x509-parser) crate. Each certificate the
//! handshake parser extracts is fully decoded: subject and issuer names, serial number,
//! and a check that nothing follows the DER structure.
//!
//! Certificates are parsed, not validated. Signatures, validity periods and trust
//! anchors are the caller's concern.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tlsniff_core::{Config, HandshakeParser};
//! use tlsniff_x509::X509CertificateParser;
//!
//! let parser = HandshakeParser::with_certificate_parser(
//!     Config::default(),
//!     Arc::new(X509CertificateParser::new()),
//! );
//! assert!(parser.certificates().is_none());
//! ```

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use bytes::Bytes;
use tlsniff_core::{CertificateParser, Error, ParsedCertificate, Result};
use x509_parser::prelude::{FromDer, X509Certificate};

/// [`CertificateParser`] backed by `x509-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509CertificateParser {
    allow_trailing: bool,
}

impl X509CertificateParser {
    /// Create a parser that rejects bytes after the certificate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept blobs with bytes after the DER structure.
    ///
    /// Some broken servers pad certificates; the padding is dropped.
    pub fn allow_trailing_bytes(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }
}

impl CertificateParser for X509CertificateParser {
    fn parse(&self, der: &[u8]) -> Result<ParsedCertificate> {
        let (rest, cert) = X509Certificate::from_der(der)
            .map_err(|e| Error::Certificate(format!("invalid X.509 certificate: {}", e)))?;

        if !rest.is_empty() && !self.allow_trailing {
            return Err(Error::Certificate(format!(
                "{} bytes after certificate",
                rest.len()
            )));
        }
        let used = der.len() - rest.len();

        let subject = cert.subject().to_string();
        let issuer = cert.issuer().to_string();
        tracing::trace!(subject = %subject, issuer = %issuer, "parsed certificate");

        Ok(ParsedCertificate {
            der: Bytes::copy_from_slice(&der[..used]),
            subject: Some(subject),
            issuer: Some(issuer),
            serial: cert.raw_serial().to_vec(),
        })
    }
}

/// Common name of a parsed certificate's subject, if it has one.
///
/// Re-parses the DER; meant for logging and tests, not hot paths.
pub fn subject_common_name(cert: &ParsedCertificate) -> Option<String> {
    let (_, parsed) = X509Certificate::from_der(&cert.der).ok()?;
    let cn = parsed
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|s| s.to_string());
    cn
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF: &[u8] = include_bytes!("../tests/data/leaf.der");
    const CA: &[u8] = include_bytes!("../tests/data/ca.der");

    #[test]
    fn test_parse_leaf() {
        let cert = X509CertificateParser::new().parse(LEAF).unwrap();
        assert_eq!(cert.serial, vec![0x20, 0x02]);
        assert!(cert.subject.unwrap().contains("CN=leaf.example.com"));
        assert!(cert.issuer.unwrap().contains("CN=TLSniff Test CA"));
        assert_eq!(&cert.der[..], LEAF);
    }

    #[test]
    fn test_common_name() {
        let cert = X509CertificateParser::new().parse(CA).unwrap();
        assert_eq!(
            subject_common_name(&cert).as_deref(),
            Some("TLSniff Test CA")
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut padded = LEAF.to_vec();
        padded.extend_from_slice(&[0, 0]);

        let strict = X509CertificateParser::new();
        assert!(matches!(strict.parse(&padded), Err(Error::Certificate(_))));

        let lenient = X509CertificateParser::new().allow_trailing_bytes(true);
        let cert = lenient.parse(&padded).unwrap();
        assert_eq!(&cert.der[..], LEAF);
    }

    #[test]
    fn test_garbage_rejected() {
        let parser = X509CertificateParser::new();
        assert!(parser.parse(b"definitely not DER").is_err());
        assert!(parser.parse(&LEAF[..LEAF.len() / 2]).is_err());
    }
}
