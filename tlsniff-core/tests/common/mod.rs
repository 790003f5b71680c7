//! Handshake byte builders shared by the integration tests.

#![allow(dead_code)]

use bytes::BufMut;
use tlsniff_core::{FeedStatus, HandshakeParser, Result};

pub const CONTENT_CCS: u8 = 20;
pub const CONTENT_ALERT: u8 = 21;
pub const CONTENT_HANDSHAKE: u8 = 22;
pub const CONTENT_APPLICATION_DATA: u8 = 23;

pub const HS_CLIENT_HELLO: u8 = 1;
pub const HS_SERVER_HELLO: u8 = 2;
pub const HS_NEW_SESSION_TICKET: u8 = 4;
pub const HS_CERTIFICATE: u8 = 11;
pub const HS_SERVER_KEY_EXCHANGE: u8 = 12;
pub const HS_SERVER_HELLO_DONE: u8 = 14;

pub const EXT_SERVER_NAME: u16 = 0;
pub const EXT_STATUS_REQUEST: u16 = 5;
pub const EXT_SUPPORTED_GROUPS: u16 = 10;
pub const EXT_HEARTBEAT: u16 = 15;
pub const EXT_ALPN: u16 = 16;
pub const EXT_SESSION_TICKET: u16 = 35;

/// Wrap a payload in one TLS 1.2 record.
pub fn record(content_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + payload.len());
    out.put_u8(content_type);
    out.put_u16(0x0303);
    out.put_u16(payload.len() as u16);
    out.put_slice(payload);
    out
}

/// Split a payload over several records of at most `max` bytes each.
pub fn records(content_type: u8, payload: &[u8], max: usize) -> Vec<u8> {
    payload
        .chunks(max)
        .flat_map(|chunk| record(content_type, chunk))
        .collect()
}

/// Frame a handshake message: type(1) + length(3) + body.
pub fn handshake_message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.put_u8(msg_type);
    out.put_uint(body.len() as u64, 3);
    out.put_slice(body);
    out
}

/// Encode one extension entry.
pub fn extension(ext_type: u16, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + data.len());
    out.put_u16(ext_type);
    out.put_u16(data.len() as u16);
    out.put_slice(data);
    out
}

/// server_name extension data with a single host_name entry.
pub fn sni_data(host: &str) -> Vec<u8> {
    let mut entry = Vec::new();
    entry.put_u8(0);
    entry.put_u16(host.len() as u16);
    entry.put_slice(host.as_bytes());

    let mut out = Vec::new();
    out.put_u16(entry.len() as u16);
    out.put_slice(&entry);
    out
}

/// ALPN extension data.
pub fn alpn_data(protocols: &[&str]) -> Vec<u8> {
    let mut list = Vec::new();
    for proto in protocols {
        list.put_u8(proto.len() as u8);
        list.put_slice(proto.as_bytes());
    }
    let mut out = Vec::new();
    out.put_u16(list.len() as u16);
    out.put_slice(&list);
    out
}

/// Builder for ClientHello handshake messages.
#[derive(Debug, Clone)]
pub struct ClientHelloBuilder {
    version: u16,
    random: [u8; 32],
    session_id: Vec<u8>,
    ciphers: Vec<u16>,
    compression: Vec<u8>,
    extensions: Option<Vec<u8>>,
}

impl Default for ClientHelloBuilder {
    fn default() -> Self {
        Self {
            version: 0x0303,
            random: [0x5A; 32],
            session_id: Vec::new(),
            ciphers: vec![0xC02F, 0x002F, 0x0035],
            compression: vec![0],
            extensions: Some(Vec::new()),
        }
    }
}

impl ClientHelloBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn random(mut self, random: [u8; 32]) -> Self {
        self.random = random;
        self
    }

    pub fn session_id(mut self, session_id: &[u8]) -> Self {
        self.session_id = session_id.to_vec();
        self
    }

    pub fn ciphers(mut self, ciphers: &[u16]) -> Self {
        self.ciphers = ciphers.to_vec();
        self
    }

    pub fn compression(mut self, methods: &[u8]) -> Self {
        self.compression = methods.to_vec();
        self
    }

    pub fn no_extensions(mut self) -> Self {
        self.extensions = None;
        self
    }

    pub fn extension(mut self, ext_type: u16, data: &[u8]) -> Self {
        self.extensions
            .get_or_insert_with(Vec::new)
            .extend_from_slice(&extension(ext_type, data));
        self
    }

    pub fn sni(self, host: &str) -> Self {
        self.extension(EXT_SERVER_NAME, &sni_data(host))
    }

    pub fn body(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.put_u16(self.version);
        out.put_slice(&self.random);
        out.put_u8(self.session_id.len() as u8);
        out.put_slice(&self.session_id);
        out.put_u16((self.ciphers.len() * 2) as u16);
        for cipher in &self.ciphers {
            out.put_u16(*cipher);
        }
        out.put_u8(self.compression.len() as u8);
        out.put_slice(&self.compression);
        if let Some(exts) = &self.extensions {
            out.put_u16(exts.len() as u16);
            out.put_slice(exts);
        }
        out
    }

    pub fn message(&self) -> Vec<u8> {
        handshake_message(HS_CLIENT_HELLO, &self.body())
    }

    /// The ClientHello in a single handshake record.
    pub fn record(&self) -> Vec<u8> {
        record(CONTENT_HANDSHAKE, &self.message())
    }
}

/// ServerHello message selecting `cipher`.
pub fn server_hello(cipher: u16, session_id: &[u8], extensions: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16(0x0303);
    body.put_slice(&[0x42; 32]);
    body.put_u8(session_id.len() as u8);
    body.put_slice(session_id);
    body.put_u16(cipher);
    body.put_u8(0);
    if let Some(exts) = extensions {
        body.put_u16(exts.len() as u16);
        body.put_slice(exts);
    }
    handshake_message(HS_SERVER_HELLO, &body)
}

/// Certificate message carrying `blobs` in order.
pub fn certificate(blobs: &[&[u8]]) -> Vec<u8> {
    let mut list = Vec::new();
    for blob in blobs {
        list.put_uint(blob.len() as u64, 3);
        list.put_slice(blob);
    }
    let mut body = Vec::new();
    body.put_uint(list.len() as u64, 3);
    body.put_slice(&list);
    handshake_message(HS_CERTIFICATE, &body)
}

pub fn server_hello_done() -> Vec<u8> {
    handshake_message(HS_SERVER_HELLO_DONE, &[])
}

/// A full server flight: ServerHello, Certificate, ServerKeyExchange, ServerHelloDone,
/// each message in its own record.
pub fn server_flight(blobs: &[&[u8]]) -> Vec<u8> {
    let mut out = record(CONTENT_HANDSHAKE, &server_hello(0xC02F, &[], None));
    out.extend(record(CONTENT_HANDSHAKE, &certificate(blobs)));
    out.extend(record(
        CONTENT_HANDSHAKE,
        &handshake_message(HS_SERVER_KEY_EXCHANGE, &[0x03, 0x00, 0x17, 0x00]),
    ));
    out.extend(record(CONTENT_HANDSHAKE, &server_hello_done()));
    out
}

/// SSLv2-compatible ClientHello with a 2-byte record header.
pub fn legacy_client_hello(specs: &[[u8; 3]], session_id: &[u8], challenge: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u8(HS_CLIENT_HELLO);
    body.put_u16(0x0301);
    body.put_u16((specs.len() * 3) as u16);
    body.put_u16(session_id.len() as u16);
    body.put_u16(challenge.len() as u16);
    for spec in specs {
        body.put_slice(spec);
    }
    body.put_slice(session_id);
    body.put_slice(challenge);

    let mut out = Vec::new();
    out.put_u16(0x8000 | body.len() as u16);
    out.put_slice(&body);
    out
}

/// Feed `data` in chunks of `size` bytes, stopping at the first error.
pub fn feed_in_chunks(parser: &mut HandshakeParser, data: &[u8], size: usize) -> Result<FeedStatus> {
    let mut status = FeedStatus::Incomplete;
    for chunk in data.chunks(size) {
        status = parser.feed(chunk)?;
    }
    Ok(status)
}

/// Feed each record (as framed by `record`) in its own call.
pub fn feed_per_record(parser: &mut HandshakeParser, data: &[u8]) -> Result<FeedStatus> {
    let mut status = FeedStatus::Incomplete;
    let mut rest = data;
    while rest.len() >= 5 {
        let len = 5 + u16::from_be_bytes([rest[3], rest[4]]) as usize;
        let (head, tail) = rest.split_at(len.min(rest.len()));
        status = parser.feed(head)?;
        rest = tail;
    }
    if !rest.is_empty() {
        status = parser.feed(rest)?;
    }
    Ok(status)
}
