//! Manual ClientHello parsing.
//!
//! The input is untrusted and possibly still wrapped in a TLS record
//! layer. Every length and offset is checked against the remaining slice
//! before any access; a shortfall is a [`ParseError`] carrying the stage
//! that ran dry, never a panic.

use std::collections::HashMap;

use thiserror::Error;

use crate::hello::types::{KnownExtension, ParsedClientHello};
use crate::hello::{EXT_ALPN, EXT_SERVER_NAME};

const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;
const HANDSHAKE_TYPE_CLIENT_HELLO: u8 = 0x01;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed ClientHello at {stage}")]
    Malformed { stage: &'static str },
}

fn malformed(stage: &'static str) -> ParseError {
    ParseError::Malformed { stage }
}

/// Bounds-checked cursor over the input slice.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, stage: &'static str) -> Result<&'a [u8], ParseError> {
        if self.remaining() < n {
            return Err(malformed(stage));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self, stage: &'static str) -> Result<u8, ParseError> {
        Ok(self.take(1, stage)?[0])
    }

    fn u16(&mut self, stage: &'static str) -> Result<u16, ParseError> {
        let b = self.take(2, stage)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u24(&mut self, stage: &'static str) -> Result<usize, ParseError> {
        let b = self.take(3, stage)?;
        Ok(((b[0] as usize) << 16) | ((b[1] as usize) << 8) | b[2] as usize)
    }
}

/// Parse raw bytes into a [`ParsedClientHello`].
///
/// Accepts either a handshake-layer message or one still carrying the
/// 5-byte TLS record header.
pub fn parse_client_hello(raw: &[u8]) -> Result<ParsedClientHello, ParseError> {
    let mut r = Reader::new(record_body(raw));

    // Handshake header: type must be ClientHello, then a 24-bit body length.
    if r.u8("handshake-type")? != HANDSHAKE_TYPE_CLIENT_HELLO {
        return Err(malformed("handshake-type"));
    }
    let body_len = r.u24("handshake-length")?;
    let mut r = Reader::new(r.take(body_len, "handshake-length")?);

    let version = r.u16("version")?;

    let random: [u8; 32] = r
        .take(32, "random")?
        .try_into()
        .map_err(|_| malformed("random"))?;

    let session_id_len = r.u8("session-id")? as usize;
    let session_id = r.take(session_id_len, "session-id")?.to_vec();

    let cipher_len = r.u16("cipher-suites")? as usize;
    if cipher_len % 2 != 0 {
        return Err(malformed("cipher-suites"));
    }
    let cipher_bytes = r.take(cipher_len, "cipher-suites")?;
    let cipher_suites: Vec<u16> = cipher_bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();

    let compression_len = r.u8("compression-methods")? as usize;
    let compression_methods = r.take(compression_len, "compression-methods")?.to_vec();

    let mut hello = ParsedClientHello {
        version,
        random,
        session_id,
        cipher_suites,
        compression_methods,
        sni: None,
        alpn: Vec::new(),
        extensions: HashMap::new(),
    };

    // Extensions block is optional: present only when bytes remain.
    if r.remaining() > 0 {
        let block_len = r.u16("extensions")? as usize;
        let block = r.take(block_len, "extensions")?;
        parse_extensions(block, &mut hello);
    }

    Ok(hello)
}

fn record_body(raw: &[u8]) -> &[u8] {
    // A handshake record header is 0x16, 0x03, minor 0x01..=0x04. Skip it
    // only if the declared record length actually fits the buffer;
    // otherwise assume the input is already at the handshake layer.
    if raw.len() >= 5
        && raw[0] == CONTENT_TYPE_HANDSHAKE
        && raw[1] == 0x03
        && (0x01..=0x04).contains(&raw[2])
    {
        let record_len = u16::from_be_bytes([raw[3], raw[4]]) as usize;
        if 5 + record_len <= raw.len() {
            return &raw[5..];
        }
    }
    raw
}

/// Walk `(type:u16, len:u16, body)` records. A record whose declared
/// length overruns the block stops the walk; partial extension lists are
/// tolerated, not fatal.
fn parse_extensions(block: &[u8], hello: &mut ParsedClientHello) {
    let mut r = Reader::new(block);
    while r.remaining() >= 4 {
        let Ok(ext_type) = r.u16("extensions") else {
            break;
        };
        let Ok(ext_len) = r.u16("extensions") else {
            break;
        };
        let Ok(body) = r.take(ext_len as usize, "extensions") else {
            break;
        };

        match classify_extension(ext_type, body) {
            KnownExtension::ServerName(name) => {
                if hello.sni.is_none() {
                    hello.sni = name;
                }
            }
            KnownExtension::Alpn(protocols) => hello.alpn.extend(protocols),
            KnownExtension::Other => {}
        }
        hello.extensions.insert(ext_type, body.to_vec());
    }
}

/// Decode the extension bodies the codec cares about. Sub-parse failures
/// inside a body are tolerated: the extension still lands in the raw map,
/// it just contributes no structured field.
pub fn classify_extension(ext_type: u16, body: &[u8]) -> KnownExtension {
    match ext_type {
        EXT_SERVER_NAME => KnownExtension::ServerName(parse_sni(body)),
        EXT_ALPN => KnownExtension::Alpn(parse_alpn(body)),
        _ => KnownExtension::Other,
    }
}

/// server_name body: u16 list length, then `(type:u8, len:u16, name)`
/// entries. The first entry with type 0 (host_name) wins.
fn parse_sni(body: &[u8]) -> Option<String> {
    let mut r = Reader::new(body);
    let list_len = r.u16("sni").ok()? as usize;
    let avail = r.remaining();
    let mut r = Reader::new(r.take(list_len.min(avail), "sni").ok()?);
    while r.remaining() >= 3 {
        let name_type = r.u8("sni").ok()?;
        let name_len = r.u16("sni").ok()? as usize;
        let name = r.take(name_len, "sni").ok()?;
        if name_type == 0 {
            return String::from_utf8(name.to_vec()).ok();
        }
    }
    None
}

/// ALPN body: u16 protocol-list length, then `(len:u8, proto)` entries
/// until the declared list length is consumed.
fn parse_alpn(body: &[u8]) -> Vec<String> {
    let mut protocols = Vec::new();
    let Some(list_len) = body
        .get(..2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
    else {
        return protocols;
    };
    let Some(list) = body.get(2..2 + list_len) else {
        return protocols;
    };
    let mut r = Reader::new(list);
    while r.remaining() > 0 {
        let Ok(len) = r.u8("alpn") else { break };
        let Ok(proto) = r.take(len as usize, "alpn") else {
            break;
        };
        if let Ok(proto) = std::str::from_utf8(proto) {
            protocols.push(proto.to_string());
        }
    }
    protocols
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-assemble a handshake-layer ClientHello from parts.
    fn build_hello(
        session_id: &[u8],
        cipher_suites: &[u16],
        compression: &[u8],
        extensions: &[(u16, Vec<u8>)],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&[0x03, 0x03]); // version TLS 1.2
        body.extend_from_slice(&[0xAB; 32]); // random
        body.push(session_id.len() as u8);
        body.extend_from_slice(session_id);
        body.extend_from_slice(&((cipher_suites.len() * 2) as u16).to_be_bytes());
        for cs in cipher_suites {
            body.extend_from_slice(&cs.to_be_bytes());
        }
        body.push(compression.len() as u8);
        body.extend_from_slice(compression);
        if !extensions.is_empty() {
            let mut block = Vec::new();
            for (ext_type, ext_body) in extensions {
                block.extend_from_slice(&ext_type.to_be_bytes());
                block.extend_from_slice(&(ext_body.len() as u16).to_be_bytes());
                block.extend_from_slice(ext_body);
            }
            body.extend_from_slice(&(block.len() as u16).to_be_bytes());
            body.extend_from_slice(&block);
        }

        let mut msg = vec![0x01];
        msg.extend_from_slice(&[
            (body.len() >> 16) as u8,
            (body.len() >> 8) as u8,
            body.len() as u8,
        ]);
        msg.extend_from_slice(&body);
        msg
    }

    fn sni_extension(host: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&((host.len() + 3) as u16).to_be_bytes());
        body.push(0); // host_name
        body.extend_from_slice(&(host.len() as u16).to_be_bytes());
        body.extend_from_slice(host.as_bytes());
        body
    }

    fn alpn_extension(protocols: &[&str]) -> Vec<u8> {
        let mut list = Vec::new();
        for p in protocols {
            list.push(p.len() as u8);
            list.extend_from_slice(p.as_bytes());
        }
        let mut body = Vec::new();
        body.extend_from_slice(&(list.len() as u16).to_be_bytes());
        body.extend_from_slice(&list);
        body
    }

    fn wrap_record(handshake: &[u8]) -> Vec<u8> {
        let mut rec = vec![0x16, 0x03, 0x01];
        rec.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
        rec.extend_from_slice(handshake);
        rec
    }

    #[test]
    fn parses_full_hello() {
        let msg = build_hello(
            &[0x11; 32],
            &[0x1301, 0x1302, 0xC02B],
            &[0x00],
            &[
                (EXT_SERVER_NAME, sni_extension("example.com")),
                (0x000a, vec![0x00, 0x02, 0x00, 0x1d]),
                (EXT_ALPN, alpn_extension(&["h2", "http/1.1"])),
            ],
        );
        let hello = parse_client_hello(&msg).unwrap();
        assert_eq!(hello.version, 0x0303);
        assert_eq!(hello.random, [0xAB; 32]);
        assert_eq!(hello.session_id, vec![0x11; 32]);
        assert_eq!(hello.cipher_suites, vec![0x1301, 0x1302, 0xC02B]);
        assert_eq!(hello.compression_methods, vec![0x00]);
        assert_eq!(hello.sni.as_deref(), Some("example.com"));
        assert_eq!(hello.alpn, vec!["h2", "http/1.1"]);
        assert_eq!(hello.extension_types(), vec![0x0000, 0x000a, 0x0010]);
    }

    #[test]
    fn record_layer_is_skipped() {
        let msg = build_hello(&[], &[0x1301], &[0x00], &[]);
        let rec = wrap_record(&msg);
        assert_eq!(parse_client_hello(&rec).unwrap(), parse_client_hello(&msg).unwrap());
    }

    #[test]
    fn record_header_with_lying_length_treated_as_handshake() {
        // Looks like a record header, but the declared length exceeds the
        // buffer: the bytes must be re-read as handshake layer, where
        // 0x16 is not a ClientHello type.
        let data = [0x16, 0x03, 0x01, 0xFF, 0xFF, 0x01, 0x00];
        assert_eq!(
            parse_client_hello(&data),
            Err(ParseError::Malformed {
                stage: "handshake-type"
            })
        );
    }

    #[test]
    fn rejects_non_client_hello_type() {
        let mut msg = build_hello(&[], &[0x1301], &[0x00], &[]);
        msg[0] = 0x02; // ServerHello
        assert_eq!(
            parse_client_hello(&msg),
            Err(ParseError::Malformed {
                stage: "handshake-type"
            })
        );
    }

    #[test]
    fn rejects_odd_cipher_suite_length() {
        let mut body = Vec::new();
        body.extend_from_slice(&[0x03, 0x03]);
        body.extend_from_slice(&[0x00; 32]);
        body.push(0); // empty session id
        body.extend_from_slice(&3u16.to_be_bytes()); // odd
        body.extend_from_slice(&[0x13, 0x01, 0x13]);
        let mut msg = vec![0x01, 0x00, 0x00, body.len() as u8];
        msg.extend_from_slice(&body);
        assert_eq!(
            parse_client_hello(&msg),
            Err(ParseError::Malformed {
                stage: "cipher-suites"
            })
        );
    }

    #[test]
    fn rejects_truncation_at_every_stage() {
        let msg = build_hello(
            &[0x22; 8],
            &[0x1301, 0xC02B],
            &[0x00],
            &[(EXT_SERVER_NAME, sni_extension("a.test"))],
        );
        // Keep the handshake length field honest about the truncation by
        // cutting whole messages short instead of rewriting lengths.
        for len in 0..msg.len() {
            assert!(
                parse_client_hello(&msg[..len]).is_err(),
                "truncation at {len} must fail"
            );
        }
    }

    #[test]
    fn missing_extensions_block_is_fine() {
        let msg = build_hello(&[], &[0x1301], &[0x00], &[]);
        let hello = parse_client_hello(&msg).unwrap();
        assert!(hello.extensions.is_empty());
        assert!(hello.sni.is_none());
        assert!(hello.alpn.is_empty());
    }

    #[test]
    fn overrunning_extension_record_stops_without_error() {
        let mut msg = build_hello(&[], &[0x1301], &[0x00], &[(0x000a, vec![0x00, 0x02, 0x00, 0x1d])]);
        // Append a record that declares 100 body bytes but carries none.
        // It must be ignored, along with anything after it.
        let tail = [0x00u8, 0x15, 0x00, 0x64];
        msg.extend_from_slice(&tail);
        // Fix up the handshake and extension-block lengths.
        let body_len = msg.len() - 4;
        msg[1] = (body_len >> 16) as u8;
        msg[2] = (body_len >> 8) as u8;
        msg[3] = body_len as u8;
        let ext_block_off = 4 + 2 + 32 + 1 + 2 + 2 + 1 + 1;
        let block_len = msg.len() - ext_block_off - 2;
        msg[ext_block_off..ext_block_off + 2].copy_from_slice(&(block_len as u16).to_be_bytes());

        let hello = parse_client_hello(&msg).unwrap();
        assert_eq!(hello.extension_types(), vec![0x000a]);
        assert!(!hello.extensions.contains_key(&0x0015));
    }

    #[test]
    fn first_host_name_entry_wins() {
        let mut body = Vec::new();
        // Two entries: an unknown type 1, then two host names.
        let mut list = Vec::new();
        list.push(1u8); // not host_name
        list.extend_from_slice(&2u16.to_be_bytes());
        list.extend_from_slice(b"xx");
        list.push(0u8);
        list.extend_from_slice(&5u16.to_be_bytes());
        list.extend_from_slice(b"first");
        list.push(0u8);
        list.extend_from_slice(&6u16.to_be_bytes());
        list.extend_from_slice(b"second");
        body.extend_from_slice(&(list.len() as u16).to_be_bytes());
        body.extend_from_slice(&list);

        let msg = build_hello(&[], &[0x1301], &[0x00], &[(EXT_SERVER_NAME, body)]);
        let hello = parse_client_hello(&msg).unwrap();
        assert_eq!(hello.sni.as_deref(), Some("first"));
    }

    #[test]
    fn malformed_sni_body_is_tolerated() {
        let msg = build_hello(
            &[],
            &[0x1301],
            &[0x00],
            &[(EXT_SERVER_NAME, vec![0xFF])], // too short for a list length
        );
        let hello = parse_client_hello(&msg).unwrap();
        assert!(hello.sni.is_none());
        assert!(hello.extensions.contains_key(&EXT_SERVER_NAME));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(parse_client_hello(&[]).is_err());
    }
}
