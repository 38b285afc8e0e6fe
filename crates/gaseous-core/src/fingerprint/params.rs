use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The parameter delta shipped instead of full hello bytes when a frame
/// uses fingerprint mode (`templateId == 0xFFFF`).
///
/// Everything a reconstruction needs beyond the spec itself: which spec,
/// plus the per-connection values (SNI, ALPN, random, session id) and a
/// reserved per-extension override map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintParams {
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    /// The 32-byte client random; ill-sized values are ignored on rebuild.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub random: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_id: Vec<u8>,
    /// Raw extension-body replacements keyed by extension type. Reserved
    /// for deltas the named fields cannot express.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<u16, Vec<u8>>,
}

impl FingerprintParams {
    /// Serialize to the wire form carried in fingerprint-mode payloads.
    pub fn to_wire(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse back from the wire form.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
