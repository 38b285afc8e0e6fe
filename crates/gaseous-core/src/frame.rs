//! The Gaseous frame codec.
//!
//! Wire layout, all integers big-endian:
//!
//! ```text
//! [optional 1-byte record marker 0xFE]
//! magic(2)="GS"  version(1)=1  algo(1)  helloType(1)  templateId(2)  dataLen(4)
//! <dataLen bytes of compressed payload>
//! ```

use std::fmt;

use thiserror::Error;

use crate::compress::Algo;

/// First two bytes of every frame.
pub const MAGIC: [u8; 2] = *b"GS";
/// Current protocol version.
pub const VERSION: u8 = 1;
/// Fixed header size, marker excluded.
pub const HEADER_LEN: usize = 11;
/// Optional record marker for multiplexed transports.
pub const RECORD_MARKER: u8 = 0xFE;

/// Template id for raw mode: the payload is the handshake message itself.
pub const TEMPLATE_RAW: u16 = 0;
/// Template id for fingerprint mode: the payload is serialized
/// [`FingerprintParams`](crate::fingerprint::FingerprintParams).
pub const TEMPLATE_FINGERPRINT: u16 = 0xFFFF;

/// Direction of the encapsulated handshake message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelloType {
    Client = 1,
    Server = 2,
}

impl HelloType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Client),
            2 => Some(Self::Server),
            _ => None,
        }
    }
}

impl fmt::Display for HelloType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "ClientHello"),
            Self::Server => write!(f, "ServerHello"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("truncated or invalid frame")]
    Truncated,
    #[error("bad magic {found:02x?}, expected \"GS\"")]
    BadMagic { found: [u8; 2] },
    #[error("bad protocol version {found}, expected {VERSION}")]
    BadVersion { found: u8 },
    #[error("unknown hello type byte {found}")]
    UnknownHelloType { found: u8 },
    #[error("hello type mismatch: frame carries {found}, caller expected {expected}")]
    BadType {
        expected: HelloType,
        found: HelloType,
    },
}

/// Decoded fixed header. `algo` stays a raw byte here; the compression
/// dispatch is where an unknown id turns into `UnsupportedAlgorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub algo: u8,
    pub hello_type: HelloType,
    pub template_id: u16,
    pub data_len: u32,
}

/// Serialize a frame. The payload must already be compressed.
pub fn encode(
    hello_type: HelloType,
    algo: Algo,
    template_id: u16,
    payload: &[u8],
    with_marker: bool,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + HEADER_LEN + payload.len());
    if with_marker {
        out.push(RECORD_MARKER);
    }
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(algo.as_u8());
    out.push(hello_type.as_u8());
    out.extend_from_slice(&template_id.to_be_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Decode a frame whose direction the caller already expects.
///
/// Strips the optional record marker, validates magic, version, direction,
/// and the declared payload length, and returns the header together with
/// the exact payload slice. No payload bytes are copied.
pub fn decode(data: &[u8], expected: HelloType) -> Result<(FrameHeader, &[u8]), FrameError> {
    let (header, payload) = decode_any(data)?;
    if header.hello_type != expected {
        return Err(FrameError::BadType {
            expected,
            found: header.hello_type,
        });
    }
    Ok((header, payload))
}

/// Decode a frame of either direction; the caller dispatches on the
/// returned header's `hello_type`.
pub fn decode_any(data: &[u8]) -> Result<(FrameHeader, &[u8]), FrameError> {
    let data = strip_marker(data);
    if data.len() < HEADER_LEN {
        return Err(FrameError::Truncated);
    }
    if data[..2] != MAGIC {
        return Err(FrameError::BadMagic {
            found: [data[0], data[1]],
        });
    }
    if data[2] != VERSION {
        return Err(FrameError::BadVersion { found: data[2] });
    }
    let hello_type =
        HelloType::from_u8(data[4]).ok_or(FrameError::UnknownHelloType { found: data[4] })?;
    let header = FrameHeader {
        version: data[2],
        algo: data[3],
        hello_type,
        template_id: u16::from_be_bytes([data[5], data[6]]),
        data_len: u32::from_be_bytes([data[7], data[8], data[9], data[10]]),
    };
    let end = HEADER_LEN
        .checked_add(header.data_len as usize)
        .ok_or(FrameError::Truncated)?;
    if end > data.len() {
        return Err(FrameError::Truncated);
    }
    Ok((header, &data[HEADER_LEN..end]))
}

/// Cheap sniff: does this buffer start a Gaseous frame (marker-tolerant)?
pub fn is_gaseous(data: &[u8]) -> bool {
    let data = strip_marker(data);
    data.len() >= 2 && data[..2] == MAGIC
}

fn strip_marker(data: &[u8]) -> &[u8] {
    match data.first() {
        Some(&RECORD_MARKER) => &data[1..],
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(with_marker: bool) -> Vec<u8> {
        encode(
            HelloType::Client,
            Algo::Brotli,
            TEMPLATE_RAW,
            b"payload",
            with_marker,
        )
    }

    #[test]
    fn encode_layout() {
        let frame = sample_frame(true);
        assert_eq!(frame[0], RECORD_MARKER);
        assert_eq!(&frame[1..3], b"GS");
        assert_eq!(frame[3], VERSION);
        assert_eq!(frame[4], Algo::Brotli.as_u8());
        assert_eq!(frame[5], HelloType::Client.as_u8());
        assert_eq!(&frame[6..8], &[0x00, 0x00]); // template id 0
        assert_eq!(&frame[8..12], &[0x00, 0x00, 0x00, 0x07]); // data len 7
        assert_eq!(&frame[12..], b"payload");
    }

    #[test]
    fn decode_round_trip_with_and_without_marker() {
        for with_marker in [true, false] {
            let frame = sample_frame(with_marker);
            let (header, payload) = decode(&frame, HelloType::Client).unwrap();
            assert_eq!(header.version, VERSION);
            assert_eq!(header.algo, Algo::Brotli.as_u8());
            assert_eq!(header.hello_type, HelloType::Client);
            assert_eq!(header.template_id, TEMPLATE_RAW);
            assert_eq!(header.data_len, 7);
            assert_eq!(payload, b"payload");
        }
    }

    #[test]
    fn decode_rejects_flipped_magic() {
        let frame = sample_frame(false);
        for i in 0..2 {
            let mut bad = frame.clone();
            bad[i] ^= 0xFF;
            assert!(matches!(
                decode(&bad, HelloType::Client),
                Err(FrameError::BadMagic { .. })
            ));
        }
    }

    #[test]
    fn decode_rejects_wrong_version() {
        let mut frame = sample_frame(false);
        frame[2] = 2;
        assert_eq!(
            decode(&frame, HelloType::Client),
            Err(FrameError::BadVersion { found: 2 })
        );
    }

    #[test]
    fn decode_rejects_mismatched_direction() {
        let frame = sample_frame(false);
        assert_eq!(
            decode(&frame, HelloType::Server),
            Err(FrameError::BadType {
                expected: HelloType::Server,
                found: HelloType::Client,
            })
        );
    }

    #[test]
    fn decode_rejects_unknown_hello_type() {
        let mut frame = sample_frame(false);
        frame[4] = 9;
        assert_eq!(
            decode_any(&frame),
            Err(FrameError::UnknownHelloType { found: 9 })
        );
    }

    #[test]
    fn decode_rejects_every_truncation() {
        let frame = sample_frame(true);
        for len in 0..frame.len() {
            assert_eq!(
                decode(&frame[..len], HelloType::Client),
                Err(FrameError::Truncated),
                "truncation at {len} must be detected"
            );
        }
    }

    #[test]
    fn decode_rejects_overlong_data_len() {
        let mut frame = sample_frame(false);
        frame[7..11].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(decode(&frame, HelloType::Client), Err(FrameError::Truncated));
    }

    #[test]
    fn sniff_helper() {
        assert!(is_gaseous(&sample_frame(true)));
        assert!(is_gaseous(&sample_frame(false)));
        assert!(is_gaseous(b"GS"));
        assert!(!is_gaseous(b"G"));
        assert!(!is_gaseous(&[0x16, 0x03, 0x01]));
    }
}
