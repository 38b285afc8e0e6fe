//! Scores a parsed ClientHello against the fingerprint database.
//!
//! The score is a plain integer sum over independent signals; the best
//! spec is accepted only when it clears the threshold, so an unusual
//! client falls back to raw-mode framing instead of a bad impersonation.

use crate::fingerprint::engine::FingerprintSpec;
use crate::fingerprint::params::FingerprintParams;
use crate::hello::grease::filter_grease_u16;
use crate::hello::types::ParsedClientHello;

/// Minimum score for a match to be accepted. Below this, the matcher
/// reports "no match" and packing ships the raw bytes.
pub const MATCH_THRESHOLD: u32 = 50;

const CIPHER_WEIGHT: u32 = 3;
const ALPN_WEIGHT: u32 = 4;
const COMPRESSION_BONUS: u32 = 8;
const SNI_BONUS: u32 = 10;
const EXTENSION_WEIGHT: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: u32,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Score every spec and return the best one at or above the
    /// threshold, together with the parameter delta that would rebuild
    /// this hello from it. Ties keep the earliest spec in database order.
    pub fn best_match<'a>(
        &self,
        hello: &ParsedClientHello,
        specs: &'a [FingerprintSpec],
    ) -> Option<(&'a FingerprintSpec, FingerprintParams)> {
        let mut best: Option<(&FingerprintSpec, u32)> = None;
        for spec in specs {
            let score = score_spec(hello, spec);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((spec, score));
            }
        }
        let (spec, score) = best?;
        if score < self.threshold {
            return None;
        }
        Some((
            spec,
            FingerprintParams {
                spec_id: spec.id.clone(),
                sni: hello.sni.clone(),
                alpn: hello.alpn.clone(),
                random: hello.random.to_vec(),
                session_id: hello.session_id.clone(),
                overrides: Default::default(),
            },
        ))
    }
}

/// One spec's score against one hello. GREASE values are stripped from
/// the client's lists first; spec databases do not carry them.
pub fn score_spec(hello: &ParsedClientHello, spec: &FingerprintSpec) -> u32 {
    let mut score = 0u32;

    // Cipher-suite alignment: unordered overlap. Positional equality
    // would punish GREASE placement and client-side suite shuffling.
    let ciphers = filter_grease_u16(&hello.cipher_suites);
    if !ciphers.is_empty() && !spec.cipher_suites.is_empty() {
        let overlap = ciphers
            .iter()
            .filter(|c| spec.cipher_suites.contains(c))
            .count() as u32;
        score += overlap * CIPHER_WEIGHT;
    }

    if !hello.compression_methods.is_empty()
        && hello.compression_methods == spec.compression_methods
    {
        score += COMPRESSION_BONUS;
    }

    let alpn_overlap = hello
        .alpn
        .iter()
        .filter(|p| spec.alpn.contains(p))
        .count() as u32;
    score += alpn_overlap * ALPN_WEIGHT;

    if spec.declares_sni() && hello.sni.is_some() {
        score += SNI_BONUS;
    }

    // Extension-type-set overlap: sort both sides, merge-intersect.
    let mut hello_exts = filter_grease_u16(&hello.extension_types());
    hello_exts.sort_unstable();
    let mut spec_exts = spec.extensions.clone();
    spec_exts.sort_unstable();
    score += merge_intersect_count(&hello_exts, &spec_exts) * EXTENSION_WEIGHT;

    // Structural sanity: the random is fixed at 32 bytes by the parser,
    // and a legacy session id is either absent or a full 32 bytes.
    score += 2;
    if hello.session_id.is_empty() || hello.session_id.len() == 32 {
        score += 2;
    }

    score
}

fn merge_intersect_count(a: &[u16], b: &[u16]) -> u32 {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    common
}
