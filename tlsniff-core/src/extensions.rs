//! Hello extension decoding.
//!
//! ```text
//! struct {
//!     ExtensionType extension_type;
//!     opaque extension_data<0..2^16-1>;
//! } Extension;
//!
//! Extension extensions<0..2^16-1>;
//! ```
//!
//! Unknown extension types are skipped and flagged, never fatal. A length that runs
//! past the end of the extension block is fatal.

use crate::error::{Error, Result};
use crate::protocol::ExtensionType;
use crate::tokenizer::Tokenizer;
use std::collections::BTreeSet;

/// SNI name type for DNS host names (RFC 6066 Section 3).
pub const NAME_TYPE_HOST_NAME: u8 = 0;

/// Metadata extracted from a Hello extension block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloExtensions {
    /// First host_name entry of server_name
    pub server_name: Option<String>,

    /// First protocol of application_layer_protocol_negotiation
    pub alpn: Option<String>,

    /// session_ticket extension present
    pub session_ticket: bool,

    /// session_ticket extension carries ticket bytes
    pub has_ticket: bool,

    /// heartbeat extension present
    pub heartbeat: bool,

    /// status_request extension present
    pub status_request: bool,

    /// At least one extension type outside [`ExtensionType`] was seen
    pub unsupported: bool,

    /// Every extension type seen, in wire order
    pub types: Vec<u16>,
}

impl HelloExtensions {
    /// Decode the body of an `extensions<0..2^16-1>` vector.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut out = Self::default();
        let mut seen = BTreeSet::new();
        let mut tk = Tokenizer::new(raw);

        while !tk.at_end() {
            let ext_type = tk.read_u16("extension type")?;
            let data = tk.read_u16_prefixed("extension data")?;

            if !seen.insert(ext_type) {
                return Err(Error::malformed(format!(
                    "duplicate extension type {}",
                    ext_type
                )));
            }
            out.types.push(ext_type);
            out.apply(ext_type, data)?;
        }

        Ok(out)
    }

    fn apply(&mut self, ext_type: u16, data: &[u8]) -> Result<()> {
        match ExtensionType::from_u16(ext_type) {
            Some(ExtensionType::ServerName) => {
                self.server_name = parse_server_name(data)?;
            },
            Some(ExtensionType::ApplicationLayerProtocolNegotiation) => {
                self.alpn = Some(parse_alpn(data)?);
            },
            Some(ExtensionType::SessionTicket) => {
                self.session_ticket = true;
                self.has_ticket = !data.is_empty();
            },
            Some(ExtensionType::Heartbeat) => self.heartbeat = true,
            Some(ExtensionType::StatusRequest) => self.status_request = true,
            Some(_) => {},
            None => {
                tracing::trace!(
                    ext_type,
                    len = data.len(),
                    "skipping unsupported extension"
                );
                self.unsupported = true;
            },
        }
        Ok(())
    }
}

/// Parse server_name extension data (RFC 6066 Section 3).
///
/// Returns the first `host_name` entry; other name types are skipped. The SNI of a
/// ServerHello is empty, which yields `None`.
pub fn parse_server_name(data: &[u8]) -> Result<Option<String>> {
    if data.is_empty() {
        return Ok(None);
    }

    let mut tk = Tokenizer::new(data);
    let list = tk.read_u16_prefixed("server_name_list")?;
    tk.expect_end("server_name extension")?;

    let mut names = Tokenizer::new(list);
    while !names.at_end() {
        let name_type = names.read_u8("server_name.name_type")?;
        let name = names.read_u16_prefixed("server_name.name")?;
        if name_type == NAME_TYPE_HOST_NAME {
            let host = String::from_utf8_lossy(name).into_owned();
            tracing::debug!(host = %host, "server name indication");
            return Ok(Some(host));
        }
    }
    Ok(None)
}

/// Parse ALPN extension data (RFC 7301) and return the first protocol name.
pub fn parse_alpn(data: &[u8]) -> Result<String> {
    let mut tk = Tokenizer::new(data);
    let list = tk.read_u16_prefixed("protocol_name_list")?;
    tk.expect_end("application_layer_protocol_negotiation extension")?;

    let mut names = Tokenizer::new(list);
    let first = names.read_u8_prefixed("protocol_name")?;
    if first.is_empty() {
        return Err(Error::malformed("protocol_name: empty"));
    }
    Ok(String::from_utf8_lossy(first).into_owned())
}
