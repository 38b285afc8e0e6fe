use thiserror::Error;

use crate::compress::CompressError;
use crate::frame::FrameError;
use crate::hello::parser::ParseError;

/// Errors surfaced by any external error type the fingerprint engine uses.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for pack/unpack operations.
///
/// Frame, compression, and parse failures keep their own enums (see the
/// per-module types); everything the orchestration layer itself can fail
/// on lives here.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A template-keyed frame referenced an id nobody registered.
    #[error("unknown template id {0}")]
    UnknownTemplate(u16),

    /// Fingerprint parameters referenced a spec absent from the database.
    #[error("unknown fingerprint spec {0:?}")]
    UnknownFingerprintSpec(String),

    /// Every algorithm in the pack preference order failed.
    #[error("compression failed for every preferred algorithm: {0}")]
    CompressionFailure(String),

    /// Fingerprint parameter (de)serialization failed.
    #[error("fingerprint parameter encoding: {0}")]
    Params(#[from] serde_json::Error),

    /// Propagated unchanged from the fingerprint engine.
    #[error("fingerprint engine: {0}")]
    Engine(#[source] BoxError),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}
