//! Wire fixtures shared by the `benches/` targets.

use bytes::{BufMut, BytesMut};

const CONTENT_HANDSHAKE: u8 = 22;

fn put_u24(buf: &mut BytesMut, value: usize) {
    buf.put_uint(value as u64, 3);
}

/// Wrap `payload` in handshake records of at most `max_fragment` bytes.
pub fn records(payload: &[u8], max_fragment: usize) -> Vec<u8> {
    let mut out = BytesMut::new();
    for chunk in payload.chunks(max_fragment.max(1)) {
        out.put_u8(CONTENT_HANDSHAKE);
        out.put_u16(0x0303);
        out.put_u16(chunk.len() as u16);
        out.put_slice(chunk);
    }
    out.to_vec()
}

/// Frame a handshake message.
pub fn message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = BytesMut::with_capacity(4 + body.len());
    out.put_u8(msg_type);
    put_u24(&mut out, body.len());
    out.put_slice(body);
    out.to_vec()
}

/// A browser-sized ClientHello record: `suites` ciphers, SNI and ALPN.
pub fn client_hello(suites: u16) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u16(0x0303);
    body.put_slice(&[0x5a; 32]);
    body.put_u8(32);
    body.put_slice(&[0xa5; 32]);
    body.put_u16(suites * 2);
    for i in 0..suites {
        body.put_u16(0xC000 + i);
    }
    body.put_slice(&[1, 0]);

    let host = b"bench.example.com";
    let mut exts = BytesMut::new();
    exts.put_u16(0x0000);
    exts.put_u16(host.len() as u16 + 5);
    exts.put_u16(host.len() as u16 + 3);
    exts.put_u8(0);
    exts.put_u16(host.len() as u16);
    exts.put_slice(host);

    let alpn: &[&[u8]] = &[b"h2", b"http/1.1"];
    let list_len: usize = alpn.iter().map(|p| p.len() + 1).sum();
    exts.put_u16(0x0010);
    exts.put_u16(list_len as u16 + 2);
    exts.put_u16(list_len as u16);
    for proto in alpn {
        exts.put_u8(proto.len() as u8);
        exts.put_slice(proto);
    }

    body.put_u16(exts.len() as u16);
    body.put_slice(&exts);
    records(&message(1, &body), 16384)
}

/// ServerHello, Certificate with `certs` blobs of `cert_size` bytes, ServerHelloDone.
pub fn server_flight(certs: usize, cert_size: usize, max_fragment: usize) -> Vec<u8> {
    let mut hello = BytesMut::new();
    hello.put_u16(0x0303);
    hello.put_slice(&[0x42; 32]);
    hello.put_u8(0);
    hello.put_u16(0xC02F);
    hello.put_u8(0);

    let mut list = BytesMut::new();
    for i in 0..certs {
        put_u24(&mut list, cert_size);
        list.put_bytes(i as u8, cert_size);
    }
    let mut cert = BytesMut::new();
    put_u24(&mut cert, list.len());
    cert.put_slice(&list);

    let mut payload = message(2, &hello);
    payload.extend(message(11, &cert));
    payload.extend(message(14, &[]));
    records(&payload, max_fragment)
}
