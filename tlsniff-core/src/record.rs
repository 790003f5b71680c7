//! Record layer framing.
//!
//! Two framings exist on the wire:
//!
//! ```text
//! struct {
//!     ContentType type;
//!     ProtocolVersion version;
//!     uint16 length;
//!     opaque fragment[TLSPlaintext.length];
//! } TLSPlaintext;
//! ```
//!
//! and the SSL 2.0 record header that SSLv2-compatible ClientHellos use. The latter
//! carries no content type: either a 2-byte header with the high bit set and a 15-bit
//! length, or a 3-byte header (14-bit length plus a padding length byte). It can only
//! frame the very first record of a client stream.

use crate::error::ParseError;
use crate::protocol::{ContentType, HandshakeType, ProtocolVersion};
use crate::tokenizer::{ParseResult, Tokenizer};

/// Maximum plaintext fragment size (2^14).
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum protected record payload (2^14 + 2048).
pub const MAX_CIPHERTEXT_SIZE: usize = MAX_FRAGMENT_SIZE + 2048;

/// TLS record header size (5 bytes).
pub const RECORD_HEADER_SIZE: usize = 5;

/// Which reader frames the first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFraming {
    /// TLS records: type, version, length
    Modern,

    /// SSL 2.0 record header with a 2-byte length
    LegacyTwoByte,

    /// SSL 2.0 record header with a 3-byte length (padding form)
    LegacyThreeByte,
}

impl RecordFraming {
    /// Check if this is one of the SSL 2.0 header forms.
    pub const fn is_legacy(self) -> bool {
        !matches!(self, RecordFraming::Modern)
    }
}

/// Decide how the first record of a stream is framed.
///
/// Returns `None` while too few bytes are buffered to decide. The answer only depends
/// on the leading bytes of the stream, never on how they were chunked.
pub fn detect_framing(head: &[u8]) -> Option<RecordFraming> {
    let b0 = *head.first()?;

    if b0 & 0x80 != 0 {
        if head.len() < 3 {
            return None;
        }
        let length = u16::from_be_bytes([b0, head[1]]) & 0x7FFF;
        if length != 0 && head[2] == HandshakeType::ClientHello.to_u8() {
            return Some(RecordFraming::LegacyTwoByte);
        }
        return Some(RecordFraming::Modern);
    }

    if ContentType::from_u8(b0).is_some() {
        return Some(RecordFraming::Modern);
    }

    if head.len() < 5 {
        return None;
    }
    let padded_hello =
        head[3] == HandshakeType::ClientHello.to_u8() && (head[4] == 0x00 || head[4] == 0x03);
    if padded_hello {
        Some(RecordFraming::LegacyThreeByte)
    } else {
        Some(RecordFraming::Modern)
    }
}

/// A framed record, borrowing its payload from the accumulation buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Content type
    pub content_type: ContentType,

    /// Record version
    pub version: ProtocolVersion,

    /// Record payload
    pub fragment: &'a [u8],
}

/// Read one modern record from a streaming tokenizer.
///
/// With `protected` set the payload may be ciphertext and may be larger than a
/// plaintext fragment. On underrun the tokenizer is left where it started.
pub fn read_record<'a>(tk: &mut Tokenizer<'a>, protected: bool) -> ParseResult<Record<'a>> {
    let start = tk.checkpoint();
    let result = read_record_inner(tk, protected);
    if matches!(result, Err(ParseError::Underrun)) {
        tk.rollback(start);
    }
    result
}

fn read_record_inner<'a>(tk: &mut Tokenizer<'a>, protected: bool) -> ParseResult<Record<'a>> {
    let raw_type = tk.read_u8("record.type")?;
    let content_type = ContentType::from_u8(raw_type).ok_or_else(|| {
        ParseError::Malformed(format!("record.type: unknown content type {}", raw_type))
    })?;

    let major = tk.read_u8("record.version")?;
    let minor = tk.read_u8("record.version")?;
    let version = ProtocolVersion::from_wire(major, minor).ok_or_else(|| {
        ParseError::Malformed(format!(
            "record.version: {:#04x}{:02x} is not an SSL/TLS version",
            major, minor
        ))
    })?;

    let length = tk.read_u16("record.length")? as usize;
    let limit = if protected {
        MAX_CIPHERTEXT_SIZE
    } else {
        MAX_FRAGMENT_SIZE
    };
    if length > limit {
        return Err(ParseError::Malformed(format!(
            "record.length: {} exceeds {}",
            length, limit
        )));
    }
    if length == 0 && content_type != ContentType::ApplicationData {
        return Err(ParseError::Malformed(format!(
            "record.length: empty {} record",
            content_type.name()
        )));
    }

    let fragment = tk.read_bytes(length, "record.fragment")?;
    tracing::trace!(
        content_type = content_type.name(),
        version = %version,
        length,
        "framed record"
    );

    Ok(Record {
        content_type,
        version,
        fragment,
    })
}

/// Read the SSL 2.0 record carrying an SSLv2-compatible ClientHello.
///
/// Returns the record body (message type onwards) with any padding stripped.
pub fn read_legacy_record<'a>(
    tk: &mut Tokenizer<'a>,
    framing: RecordFraming,
) -> ParseResult<&'a [u8]> {
    let start = tk.checkpoint();
    let result = read_legacy_record_inner(tk, framing);
    if matches!(result, Err(ParseError::Underrun)) {
        tk.rollback(start);
    }
    result
}

fn read_legacy_record_inner<'a>(
    tk: &mut Tokenizer<'a>,
    framing: RecordFraming,
) -> ParseResult<&'a [u8]> {
    let (length, padding) = match framing {
        RecordFraming::LegacyTwoByte => {
            let head = tk.read_u16("sslv2.header")?;
            ((head & 0x7FFF) as usize, 0usize)
        },
        RecordFraming::LegacyThreeByte => {
            let head = tk.read_u16("sslv2.header")?;
            let padding = tk.read_u8("sslv2.padding")? as usize;
            ((head & 0x3FFF) as usize, padding)
        },
        RecordFraming::Modern => {
            return Err(ParseError::Malformed(
                "sslv2.header: record is not SSL 2.0 framed".into(),
            ));
        },
    };

    if padding > length {
        return Err(ParseError::Malformed(format!(
            "sslv2.padding: {} exceeds record length {}",
            padding, length
        )));
    }

    let body = tk.read_bytes(length, "sslv2.record")?;
    tracing::trace!(length, padding, "framed SSLv2 record");
    Ok(&body[..length - padding])
}
