//! Driving the parser from transports.

use std::io::{self, Cursor, Read};
use tlsniff::{CipherId, Config, Error, ParseState, ProtocolVersion, Sniffer};

fn handshake_record(messages: &[u8]) -> Vec<u8> {
    let mut out = vec![22, 0x03, 0x01];
    out.extend_from_slice(&(messages.len() as u16).to_be_bytes());
    out.extend_from_slice(messages);
    out
}

fn message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![msg_type];
    out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(body);
    out
}

/// TLS 1.2 ClientHello offering two suites with SNI `example.com`.
fn client_hello() -> Vec<u8> {
    let mut body = hex::decode("0303").unwrap();
    body.extend_from_slice(&[0x11; 32]);
    body.extend_from_slice(&hex::decode("00" /* session id */).unwrap());
    body.extend_from_slice(&hex::decode("0004c02f002f0100").unwrap());
    // server_name extension
    body.extend_from_slice(&hex::decode("001400000010000e00000b").unwrap());
    body.extend_from_slice(b"example.com");
    handshake_record(&message(1, &body))
}

/// Yields one byte per read, with an interruption before the first.
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    interrupted: bool,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }
}

/// Fails after its data is exhausted.
struct Reset(Cursor<Vec<u8>>);

impl Read for Reset {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
            n => Ok(n),
        }
    }
}

#[test]
fn test_client_hello_from_cursor() {
    let mut data = client_hello();
    let hello_len = data.len();
    data.extend_from_slice(b"\x17\x03\x03\x00\x02hi");

    let outcome = Sniffer::new(Cursor::new(data.clone()), Config::default())
        .run()
        .unwrap();

    assert_eq!(outcome.state, ParseState::HelloReceived);
    assert_eq!(outcome.summary.sni(), "example.com");
    assert_eq!(outcome.summary.record_version, Some(ProtocolVersion::Tls10));
    assert_eq!(outcome.summary.hello_version, Some(ProtocolVersion::Tls12));
    assert!(outcome.summary.has_cipher(0xC02Fu16));
    assert!(outcome.summary.ciphers.contains(&CipherId::Suite(0x002F)));
    assert!(!outcome.resuming);
    assert_eq!(&outcome.trailing[..], &data[hello_len..]);
}

#[test]
fn test_one_byte_reads() {
    let data = client_hello();
    let reader = Trickle {
        data: data.clone(),
        pos: 0,
        interrupted: false,
    };

    let sniffer = Sniffer::new(reader, Config::default()).with_chunk_size(1);
    let outcome = sniffer.run().unwrap();
    assert_eq!(outcome.summary.sni(), "example.com");
    assert!(outcome.trailing.is_empty());
}

#[test]
fn test_outcome_keeps_rest_of_record() {
    let mut hello = hex::decode("0303").unwrap();
    hello.extend_from_slice(&[0x42; 32]);
    hello.extend_from_slice(&hex::decode("00c02f00").unwrap());
    let done = message(14, &[]);
    let mut messages = message(2, &hello);
    messages.extend_from_slice(&done);

    let config = Config::builder()
        .with_target_state(ParseState::HelloReceived)
        .build()
        .unwrap();
    let outcome = Sniffer::new(Cursor::new(handshake_record(&messages)), config)
        .run()
        .unwrap();
    assert_eq!(outcome.state, ParseState::HelloReceived);
    assert_eq!(&outcome.pending_fragments[..], &done[..]);
    assert!(outcome.trailing.is_empty());
}

#[test]
fn test_end_of_input_is_truncated() {
    let data = client_hello();
    let short = data[..data.len() - 3].to_vec();

    let err = Sniffer::new(Cursor::new(short.clone()), Config::default())
        .run()
        .unwrap_err();
    match err {
        Error::Sniff(tlsniff::tlsniff_core::Error::Truncated { state, pending }) => {
            assert_eq!(state, ParseState::HelloStarted);
            assert_eq!(pending, short.len());
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_io_error_propagates() {
    let data = client_hello();
    let reader = Reset(Cursor::new(data[..10].to_vec()));

    let err = Sniffer::new(reader, Config::default()).run().unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
}

#[test]
fn test_parser_error_surfaces() {
    let err = Sniffer::new(Cursor::new(b"\x16\x03\x03\x00\x00".to_vec()), Config::default())
        .run()
        .unwrap_err();
    assert!(matches!(
        err.sniff_error(),
        Some(tlsniff::tlsniff_core::Error::Malformed(_))
    ));
}

#[cfg(feature = "x509")]
#[test]
fn test_x509_chain() {
    const LEAF: &[u8] = include_bytes!("../../tlsniff-x509/tests/data/leaf.der");

    let mut hello = hex::decode("0303").unwrap();
    hello.extend_from_slice(&[0x42; 32]);
    hello.extend_from_slice(&hex::decode("00c02f00").unwrap());

    let mut list = (LEAF.len() as u32).to_be_bytes()[1..].to_vec();
    list.extend_from_slice(LEAF);
    let mut cert_body = (list.len() as u32).to_be_bytes()[1..].to_vec();
    cert_body.extend_from_slice(&list);

    let mut messages = message(2, &hello);
    messages.extend(message(11, &cert_body));
    messages.extend(message(14, &[]));

    let outcome = Sniffer::with_x509(Cursor::new(handshake_record(&messages)), Config::default())
        .run()
        .unwrap();
    assert_eq!(outcome.state, ParseState::HelloDoneReceived);

    let chain = outcome.certificates.unwrap();
    let leaf = chain.leaf().unwrap().parsed().unwrap();
    assert_eq!(
        tlsniff::tlsniff_x509::subject_common_name(leaf).as_deref(),
        Some("leaf.example.com")
    );
}
