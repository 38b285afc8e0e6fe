use std::collections::HashMap;

/// Structured fields extracted from a raw ClientHello.
///
/// Built fresh per parse call; lists keep wire order where the order is
/// protocol-significant (cipher suites, ALPN), while `extensions` is a
/// plain type-to-body map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClientHello {
    /// Legacy version field of the handshake body (e.g. 0x0303)
    pub version: u16,
    /// The 32-byte client random
    pub random: [u8; 32],
    /// Legacy session id, 0–32 bytes
    pub session_id: Vec<u8>,
    /// Cipher suite values in wire order
    pub cipher_suites: Vec<u16>,
    /// Compression method bytes in wire order
    pub compression_methods: Vec<u8>,
    /// Server Name Indication, first host_name entry
    pub sni: Option<String>,
    /// ALPN protocol names in wire order
    pub alpn: Vec<String>,
    /// Raw extension bodies keyed by extension type
    pub extensions: HashMap<u16, Vec<u8>>,
}

impl ParsedClientHello {
    /// Extension type ids, sorted. Wire order is not preserved by the
    /// extension map, so this is the canonical comparable form.
    pub fn extension_types(&self) -> Vec<u16> {
        let mut types: Vec<u16> = self.extensions.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

/// Closed classification of the extension bodies the codec inspects.
/// Everything the matcher does not need to look inside stays `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownExtension {
    /// server_name: the first well-formed host_name entry, if any
    ServerName(Option<String>),
    /// ALPN: every decodable protocol name, in wire order
    Alpn(Vec<String>),
    Other,
}
