//! Certificate chain extraction.
//!
//! ```text
//! opaque ASN.1Cert<1..2^24-1>;
//!
//! struct {
//!     ASN.1Cert certificate_list<0..2^24-1>;
//! } Certificate;
//! ```
//!
//! Each blob is handed to a [`CertificateParser`]. Without one, blobs are kept as raw
//! DER and only their framing is checked.

use crate::error::{Error, Result};
use crate::tokenizer::Tokenizer;
use bytes::Bytes;

/// Capability that turns a DER blob into a structured certificate.
///
/// Implementations should return [`Error::Certificate`] on failure.
pub trait CertificateParser: core::fmt::Debug + Send + Sync {
    /// Parse one DER-encoded certificate.
    fn parse(&self, der: &[u8]) -> Result<ParsedCertificate>;
}

/// A certificate accepted by a [`CertificateParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    /// Complete DER encoding
    pub der: Bytes,

    /// Subject distinguished name, if the parser decodes names
    pub subject: Option<String>,

    /// Issuer distinguished name, if the parser decodes names
    pub issuer: Option<String>,

    /// Serial number (big-endian, as encoded)
    pub serial: Vec<u8>,
}

/// One element of a [`CertificateChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEntry {
    /// Accepted by the configured certificate parser
    Parsed(ParsedCertificate),

    /// DER kept as-is; no certificate parser was configured
    Raw(Bytes),
}

impl ChainEntry {
    /// DER encoding of this certificate.
    pub fn der(&self) -> &[u8] {
        match self {
            ChainEntry::Parsed(cert) => &cert.der,
            ChainEntry::Raw(der) => der,
        }
    }

    /// The parsed form, if a parser was configured.
    pub fn parsed(&self) -> Option<&ParsedCertificate> {
        match self {
            ChainEntry::Parsed(cert) => Some(cert),
            ChainEntry::Raw(_) => None,
        }
    }
}

/// Certificates in wire order, leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    entries: Vec<ChainEntry>,
}

impl CertificateChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of certificates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the peer sent no certificates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The leaf (first) certificate.
    pub fn leaf(&self) -> Option<&ChainEntry> {
        self.entries.first()
    }

    /// Iterate in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }

    /// Entries in wire order.
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    fn push(&mut self, entry: ChainEntry) {
        self.entries.push(entry);
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a ChainEntry;
    type IntoIter = core::slice::Iter<'a, ChainEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Decode a Certificate message body into a chain.
///
/// Any blob the parser rejects fails the whole message; no partial chain is returned.
pub fn decode_certificate_list(
    body: &[u8],
    parser: Option<&dyn CertificateParser>,
) -> Result<CertificateChain> {
    let mut tk = Tokenizer::new(body);
    let list = tk.read_u24_prefixed("certificate_list")?;
    tk.expect_end("Certificate")?;

    let mut chain = CertificateChain::new();
    let mut certs = Tokenizer::new(list);
    while !certs.at_end() {
        let der = certs.read_u24_prefixed("ASN.1Cert")?;
        if der.is_empty() {
            return Err(Error::malformed(format!(
                "ASN.1Cert {}: empty",
                chain.len()
            )));
        }

        let entry = match parser {
            Some(parser) => {
                let cert = parser.parse(der).map_err(|e| {
                    let reason = match e {
                        Error::Certificate(msg) => msg,
                        other => other.to_string(),
                    };
                    Error::Certificate(format!("certificate {}: {}", chain.len(), reason))
                })?;
                ChainEntry::Parsed(cert)
            },
            None => ChainEntry::Raw(Bytes::copy_from_slice(der)),
        };
        chain.push(entry);
    }

    tracing::debug!(certificates = chain.len(), "certificate chain extracted");
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts blobs that start with `C`, echoing the blob as the subject.
    #[derive(Debug)]
    struct PrefixParser;

    impl CertificateParser for PrefixParser {
        fn parse(&self, der: &[u8]) -> Result<ParsedCertificate> {
            if der[0] != b'C' {
                return Err(Error::Certificate("not a test certificate".into()));
            }
            Ok(ParsedCertificate {
                der: Bytes::copy_from_slice(der),
                subject: Some(String::from_utf8_lossy(der).into_owned()),
                issuer: None,
                serial: vec![der.len() as u8],
            })
        }
    }

    fn certificate_body(blobs: &[&[u8]]) -> Vec<u8> {
        let mut list = Vec::new();
        for blob in blobs {
            list.extend_from_slice(&(blob.len() as u32).to_be_bytes()[1..]);
            list.extend_from_slice(blob);
        }
        let mut body = (list.len() as u32).to_be_bytes()[1..].to_vec();
        body.extend_from_slice(&list);
        body
    }

    #[test]
    fn test_chain_order_preserved() {
        let body = certificate_body(&[b"CA", b"CB", b"CC"]);
        let chain = decode_certificate_list(&body, Some(&PrefixParser)).unwrap();
        let subjects: Vec<_> = chain
            .iter()
            .map(|e| e.parsed().unwrap().subject.clone().unwrap())
            .collect();
        assert_eq!(subjects, vec!["CA", "CB", "CC"]);
        assert_eq!(chain.leaf().unwrap().der(), b"CA");
    }

    #[test]
    fn test_raw_chain_without_parser() {
        let body = certificate_body(&[b"\x30\x00", b"anything"]);
        let chain = decode_certificate_list(&body, None).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.entries()[1], ChainEntry::Raw(Bytes::from_static(b"anything")));
        assert!(chain.entries()[0].parsed().is_none());
    }

    #[test]
    fn test_one_bad_certificate_fails_chain() {
        let body = certificate_body(&[b"CA", b"XB", b"CC"]);
        let err = decode_certificate_list(&body, Some(&PrefixParser)).unwrap_err();
        assert_eq!(
            err,
            Error::Certificate("certificate 1: not a test certificate".into())
        );
    }

    #[test]
    fn test_empty_list_and_blob() {
        let chain = decode_certificate_list(&[0, 0, 0], None).unwrap();
        assert!(chain.is_empty());

        let body = certificate_body(&[b""]);
        assert!(matches!(
            decode_certificate_list(&body, None),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_framing_errors() {
        // Blob claims more than the list holds
        let body = [0, 0, 4, 0, 0, 9, b'C'];
        assert!(decode_certificate_list(&body, None).is_err());

        // Trailing bytes after the list
        let mut body = certificate_body(&[b"CA"]);
        body.push(0);
        assert!(decode_certificate_list(&body, None).is_err());
    }
}
