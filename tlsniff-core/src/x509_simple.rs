//! Minimal DER certificate envelope check.
//!
//! This is NOT a complete X.509 parser. It checks that a blob is a single DER
//! `SEQUENCE` whose first element is the `tbsCertificate` `SEQUENCE`, and pulls out the
//! serial number. Names are not decoded. The `tlsniff-x509` crate provides a full
//! parser.
//!
//! ```text
//! Certificate ::= SEQUENCE {
//!     tbsCertificate       TBSCertificate,
//!     signatureAlgorithm   AlgorithmIdentifier,
//!     signatureValue       BIT STRING }
//!
//! TBSCertificate ::= SEQUENCE {
//!     version         [0]  EXPLICIT Version DEFAULT v1,
//!     serialNumber         CertificateSerialNumber,
//!     ... }
//! ```

use crate::certificate::{CertificateParser, ParsedCertificate};
use crate::error::{Error, Result};
use bytes::Bytes;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;
const TAG_VERSION: u8 = 0xA0;

/// [`CertificateParser`] that validates DER framing only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerEnvelopeParser;

impl CertificateParser for DerEnvelopeParser {
    fn parse(&self, der: &[u8]) -> Result<ParsedCertificate> {
        let (tag, certificate, rest) = read_tlv(der)?;
        if tag != TAG_SEQUENCE {
            return Err(reject(format!("expected SEQUENCE, found tag {:#04x}", tag)));
        }
        if !rest.is_empty() {
            return Err(reject(format!("{} bytes after certificate", rest.len())));
        }

        let (tag, tbs, _) = read_tlv(certificate)?;
        if tag != TAG_SEQUENCE {
            return Err(reject("tbsCertificate is not a SEQUENCE"));
        }

        let (tag, value, rest) = read_tlv(tbs)?;
        let (tag, value) = if tag == TAG_VERSION {
            let (tag, value, _) = read_tlv(rest)?;
            (tag, value)
        } else {
            (tag, value)
        };
        if tag != TAG_INTEGER || value.is_empty() {
            return Err(reject("serialNumber missing"));
        }

        Ok(ParsedCertificate {
            der: Bytes::copy_from_slice(der),
            subject: None,
            issuer: None,
            serial: value.to_vec(),
        })
    }
}

fn reject(msg: impl Into<String>) -> Error {
    Error::Certificate(msg.into())
}

/// Split one DER tag-length-value off the front of `data`.
fn read_tlv(data: &[u8]) -> Result<(u8, &[u8], &[u8])> {
    let (&tag, data) = data
        .split_first()
        .ok_or_else(|| reject("truncated DER tag"))?;
    let (&first, data) = data
        .split_first()
        .ok_or_else(|| reject("truncated DER length"))?;

    let (length, data) = if first < 0x80 {
        (first as usize, data)
    } else {
        // Long form: low bits give the count of length bytes
        let count = (first & 0x7F) as usize;
        if count == 0 || count > 4 || data.len() < count {
            return Err(reject("unsupported DER length encoding"));
        }
        let length = data[..count]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        (length, &data[count..])
    };

    if data.len() < length {
        return Err(reject(format!(
            "DER value of {} bytes, {} available",
            length,
            data.len()
        )));
    }
    Ok((tag, &data[..length], &data[length..]))
}
