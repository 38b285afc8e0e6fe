use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::fingerprint::params::FingerprintParams;
use crate::hello::EXT_SERVER_NAME;

/// One entry of the fingerprint database: the shape of a known client's
/// ClientHello. The core never owns or mutates these; it only scores
/// against them and refers to them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintSpec {
    /// Stable name, e.g. "chrome-120"
    pub id: String,
    /// Cipher suite values the client offers, in its wire order
    pub cipher_suites: Vec<u16>,
    /// Compression method bytes (in practice always `[0]`)
    pub compression_methods: Vec<u8>,
    /// Extension type ids the client sends
    pub extensions: Vec<u16>,
    /// ALPN protocols the client advertises
    #[serde(default)]
    pub alpn: Vec<String>,
}

impl FingerprintSpec {
    /// Whether this client sends a server_name extension at all.
    pub fn declares_sni(&self) -> bool {
        self.extensions.contains(&EXT_SERVER_NAME)
    }
}

/// The external fingerprint engine the codec reconstructs hellos through.
///
/// Implementations own an enumerable, read-only spec database and know
/// how to serialize a complete handshake message from a spec plus the
/// per-connection parameter deltas. Engine errors are propagated to
/// callers unchanged.
pub trait FingerprintEngine {
    /// The fixed spec set, in database order. Order matters: score ties
    /// during matching keep the earliest spec.
    fn specs(&self) -> &[FingerprintSpec];

    fn spec(&self, id: &str) -> Option<&FingerprintSpec> {
        self.specs().iter().find(|s| s.id == id)
    }

    /// Rebuild full ClientHello handshake bytes from matched parameters.
    fn build_client_hello(&self, params: &FingerprintParams) -> Result<Vec<u8>, BoxError>;
}
