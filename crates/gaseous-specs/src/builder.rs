//! Serializes a complete ClientHello handshake message from a spec plus
//! parameter overrides.
//!
//! The output is shape-faithful: version, cipher suites, compression
//! methods, and the extension type sequence come from the spec, while
//! SNI, ALPN, random, and session id come from the parameters. Extension
//! bodies the spec does not pin down are emitted in a canonical minimal
//! form, so the result reparses cleanly but is not byte-identical to any
//! real capture.

use gaseous_core::fingerprint::{FingerprintParams, FingerprintSpec};
use thiserror::Error;

const EXT_SERVER_NAME: u16 = 0x0000;
const EXT_SUPPORTED_GROUPS: u16 = 0x000A;
const EXT_EC_POINT_FORMATS: u16 = 0x000B;
const EXT_SIGNATURE_ALGORITHMS: u16 = 0x000D;
const EXT_ALPN: u16 = 0x0010;
const EXT_SUPPORTED_VERSIONS: u16 = 0x002B;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown fingerprint spec {0:?}")]
    UnknownSpec(String),
    #[error("server name exceeds 65535 bytes")]
    OversizedServerName,
    #[error("ALPN protocol name exceeds 255 bytes")]
    OversizedAlpnProtocol,
    #[error("extension body exceeds 65535 bytes")]
    OversizedExtension,
}

pub fn build_client_hello(
    spec: &FingerprintSpec,
    params: &FingerprintParams,
) -> Result<Vec<u8>, BuildError> {
    let mut body = Vec::with_capacity(256);
    body.extend_from_slice(&[0x03, 0x03]); // legacy_version

    if params.random.len() == 32 {
        body.extend_from_slice(&params.random);
    } else {
        body.extend_from_slice(&[0u8; 32]);
    }

    // Ill-formed session id overrides are ignored, like the random.
    let session_id: &[u8] = if params.session_id.len() <= 32 {
        &params.session_id
    } else {
        &[]
    };
    body.push(session_id.len() as u8);
    body.extend_from_slice(session_id);

    body.extend_from_slice(&((spec.cipher_suites.len() * 2) as u16).to_be_bytes());
    for suite in &spec.cipher_suites {
        body.extend_from_slice(&suite.to_be_bytes());
    }

    body.push(spec.compression_methods.len() as u8);
    body.extend_from_slice(&spec.compression_methods);

    let mut block = Vec::with_capacity(128);
    for &ext_type in &spec.extensions {
        let ext_body = match params.overrides.get(&ext_type) {
            Some(raw) => raw.clone(),
            None => extension_body(ext_type, params)?,
        };
        if ext_body.len() > u16::MAX as usize {
            return Err(BuildError::OversizedExtension);
        }
        block.extend_from_slice(&ext_type.to_be_bytes());
        block.extend_from_slice(&(ext_body.len() as u16).to_be_bytes());
        block.extend_from_slice(&ext_body);
    }
    body.extend_from_slice(&(block.len() as u16).to_be_bytes());
    body.extend_from_slice(&block);

    let mut msg = Vec::with_capacity(4 + body.len());
    msg.push(0x01); // ClientHello
    msg.extend_from_slice(&[
        (body.len() >> 16) as u8,
        (body.len() >> 8) as u8,
        body.len() as u8,
    ]);
    msg.extend_from_slice(&body);
    Ok(msg)
}

fn extension_body(ext_type: u16, params: &FingerprintParams) -> Result<Vec<u8>, BuildError> {
    match ext_type {
        EXT_SERVER_NAME => server_name_body(params.sni.as_deref()),
        EXT_ALPN => alpn_body(&params.alpn),
        EXT_SUPPORTED_VERSIONS => Ok(vec![0x04, 0x03, 0x04, 0x03, 0x03]), // 1.3, 1.2
        EXT_SUPPORTED_GROUPS => {
            // x25519, secp256r1, secp384r1
            Ok(vec![0x00, 0x06, 0x00, 0x1D, 0x00, 0x17, 0x00, 0x18])
        }
        EXT_EC_POINT_FORMATS => Ok(vec![0x01, 0x00]), // uncompressed
        EXT_SIGNATURE_ALGORITHMS => Ok(vec![
            0x00, 0x08, 0x04, 0x03, 0x08, 0x04, 0x04, 0x01, 0x05, 0x03,
        ]),
        _ => Ok(Vec::new()),
    }
}

fn server_name_body(sni: Option<&str>) -> Result<Vec<u8>, BuildError> {
    let Some(host) = sni.filter(|h| !h.is_empty()) else {
        return Ok(Vec::new());
    };
    if host.len() > u16::MAX as usize - 3 {
        return Err(BuildError::OversizedServerName);
    }
    let mut body = Vec::with_capacity(5 + host.len());
    body.extend_from_slice(&((host.len() + 3) as u16).to_be_bytes());
    body.push(0x00); // host_name
    body.extend_from_slice(&(host.len() as u16).to_be_bytes());
    body.extend_from_slice(host.as_bytes());
    Ok(body)
}

fn alpn_body(protocols: &[String]) -> Result<Vec<u8>, BuildError> {
    if protocols.is_empty() {
        return Ok(Vec::new());
    }
    let mut list = Vec::new();
    for proto in protocols {
        if proto.len() > u8::MAX as usize {
            return Err(BuildError::OversizedAlpnProtocol);
        }
        list.push(proto.len() as u8);
        list.extend_from_slice(proto.as_bytes());
    }
    let mut body = Vec::with_capacity(2 + list.len());
    body.extend_from_slice(&(list.len() as u16).to_be_bytes());
    body.extend_from_slice(&list);
    Ok(body)
}
