//! Pack/unpack orchestration: the two directional pipelines composing the
//! parser, matcher, compression dispatch, and frame codec.

use crate::compress::{compress, decompress, Algo};
use crate::error::Error;
use crate::fingerprint::engine::FingerprintEngine;
use crate::fingerprint::matcher::{Matcher, MATCH_THRESHOLD};
use crate::fingerprint::params::FingerprintParams;
use crate::frame::{self, FrameHeader, HelloType, TEMPLATE_FINGERPRINT, TEMPLATE_RAW};
use crate::hello::parser::parse_client_hello;
use crate::template::TemplateRegistry;

/// Default compression preference for packing: best ratio first, cheapest
/// fallback last. The receiver honors whatever algo id the header
/// carries, so this is purely sender-side policy.
pub const DEFAULT_PREFERENCE: &[Algo] = &[Algo::Brotli, Algo::Zstd, Algo::Flate];

/// Knobs for the packing pipeline.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Algorithms to try, in order; the first that succeeds is used.
    pub preference: Vec<Algo>,
    /// Prefix the frame with the 0xFE record marker.
    pub with_marker: bool,
    /// Minimum fingerprint-match score; below it the hello ships raw.
    pub threshold: u32,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            preference: DEFAULT_PREFERENCE.to_vec(),
            with_marker: true,
            threshold: MATCH_THRESHOLD,
        }
    }
}

/// Encode a ClientHello into a Gaseous frame.
///
/// The hello is parsed and scored against the engine's spec database.
/// A sufficient match ships as fingerprint parameters
/// (`templateId = 0xFFFF`); anything else ships as the compressed raw
/// bytes (`templateId = 0`).
pub fn pack_client_hello(
    raw: &[u8],
    engine: &dyn FingerprintEngine,
    opts: &PackOptions,
) -> Result<Vec<u8>, Error> {
    let hello = parse_client_hello(raw)?;
    let matcher = Matcher::with_threshold(opts.threshold);
    if let Some((_, params)) = matcher.best_match(&hello, engine.specs()) {
        let wire = params.to_wire()?;
        let (algo, compressed) = compress_preferred(&wire, &opts.preference)?;
        return Ok(frame::encode(
            HelloType::Client,
            algo,
            TEMPLATE_FINGERPRINT,
            &compressed,
            opts.with_marker,
        ));
    }
    let (algo, compressed) = compress_preferred(raw, &opts.preference)?;
    Ok(frame::encode(
        HelloType::Client,
        algo,
        TEMPLATE_RAW,
        &compressed,
        opts.with_marker,
    ))
}

/// Encode a frame with a caller-chosen algorithm and template id, no
/// fingerprint matching. Covers raw ServerHello framing and
/// template-mode payloads for either direction.
pub fn pack_raw(
    hello_type: HelloType,
    raw: &[u8],
    algo: Algo,
    template_id: u16,
    with_marker: bool,
) -> Result<Vec<u8>, Error> {
    let compressed = compress(algo, raw)?;
    Ok(frame::encode(
        hello_type, algo, template_id, &compressed, with_marker,
    ))
}

/// Decode a frame that must carry a ClientHello.
pub fn unpack_client_hello(
    data: &[u8],
    registry: &TemplateRegistry,
    engine: &dyn FingerprintEngine,
) -> Result<Vec<u8>, Error> {
    let (header, payload) = frame::decode(data, HelloType::Client)?;
    unpack_payload(&header, payload, registry, Some(engine))
}

/// Decode a frame that must carry a ServerHello. Fingerprint mode does
/// not apply to this direction; raw and template modes do.
pub fn unpack_server_hello(data: &[u8], registry: &TemplateRegistry) -> Result<Vec<u8>, Error> {
    let (header, payload) = frame::decode(data, HelloType::Server)?;
    unpack_payload(&header, payload, registry, None)
}

/// Origin-side entry point for frames of unknown direction.
///
/// ServerHello frames decode normally. A ClientHello frame arriving here
/// would be the origin decoding its own peer's hello, which this side
/// does not do; it surfaces `NotImplemented` instead of guessing.
pub fn unpack_any(
    data: &[u8],
    registry: &TemplateRegistry,
) -> Result<(HelloType, Vec<u8>), Error> {
    let (header, payload) = frame::decode_any(data)?;
    match header.hello_type {
        HelloType::Client => Err(Error::NotImplemented(
            "origin-side ClientHello unpacking",
        )),
        HelloType::Server => {
            let hello = unpack_payload(&header, payload, registry, None)?;
            Ok((HelloType::Server, hello))
        }
    }
}

fn unpack_payload(
    header: &FrameHeader,
    payload: &[u8],
    registry: &TemplateRegistry,
    engine: Option<&dyn FingerprintEngine>,
) -> Result<Vec<u8>, Error> {
    let algo = Algo::try_from(header.algo)?;
    match header.template_id {
        TEMPLATE_RAW => Ok(decompress(algo, payload)?),
        TEMPLATE_FINGERPRINT => {
            let engine = engine.ok_or(Error::NotImplemented(
                "fingerprint-mode ServerHello reconstruction",
            ))?;
            let plain = decompress(algo, payload)?;
            let params = FingerprintParams::from_wire(&plain)?;
            if engine.spec(&params.spec_id).is_none() {
                return Err(Error::UnknownFingerprintSpec(params.spec_id));
            }
            engine.build_client_hello(&params).map_err(Error::Engine)
        }
        id => {
            let plain = decompress(algo, payload)?;
            let template = registry.get(id).ok_or(Error::UnknownTemplate(id))?;
            Ok(template.fill(&plain))
        }
    }
}

fn compress_preferred(data: &[u8], preference: &[Algo]) -> Result<(Algo, Vec<u8>), Error> {
    let mut failures = Vec::new();
    for &algo in preference {
        match compress(algo, data) {
            Ok(compressed) => return Ok((algo, compressed)),
            Err(e) => failures.push(e.to_string()),
        }
    }
    if failures.is_empty() {
        failures.push("empty preference order".to_string());
    }
    Err(Error::CompressionFailure(failures.join("; ")))
}
