//! Gaseous frame encapsulation for TLS ClientHello/ServerHello messages.
//!
//! A Gaseous frame is a compact container for a handshake message: an
//! 11-byte header (magic, version, compression algorithm, hello direction,
//! template id, payload length) followed by a compressed payload. Three
//! payload modes exist, selected by the template id:
//!
//! - `0` — the payload is the complete handshake message, just compressed;
//! - `0xFFFF` — the payload is a small set of fingerprint parameters
//!   (spec id, SNI, ALPN, random, session id) from which a matching
//!   fingerprint engine rebuilds the full message;
//! - anything else — the payload is appended to a pre-registered template
//!   skeleton.
//!
//! The crate owns the frame codec, the compression dispatch, a manual
//! bounds-checked ClientHello parser, and the fingerprint scoring that
//! decides when a hello can be shipped as parameters instead of bytes.
//! The fingerprint database itself sits behind the
//! [`fingerprint::FingerprintEngine`] trait; see the `gaseous-specs`
//! crate for the builtin implementation.
//!
//! The protocol provides no confidentiality or integrity of its own — it
//! is meant to run inside an already-secure channel.

pub mod codec;
pub mod compress;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod hello;
pub mod template;

pub use codec::{
    pack_client_hello, pack_raw, unpack_any, unpack_client_hello, unpack_server_hello,
    PackOptions, DEFAULT_PREFERENCE,
};
pub use compress::{compress, decompress, decompress_bounded, Algo, MAX_DECOMPRESSED_LEN};
pub use error::Error;
pub use frame::{FrameHeader, HelloType, TEMPLATE_FINGERPRINT, TEMPLATE_RAW};
pub use hello::parser::parse_client_hello;
pub use hello::types::ParsedClientHello;
pub use template::{Template, TemplateRegistry};
