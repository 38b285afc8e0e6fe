//! Builtin fingerprint-spec database and engine for the Gaseous codec.
//!
//! `gaseous-core` only ever talks to a fingerprint database through its
//! [`FingerprintEngine`] trait; this crate supplies the stock
//! implementation: a fixed table of well-known client profiles, an
//! optional JSON import for extra entries, and the ClientHello builder
//! that turns `spec + params` back into handshake bytes.

pub mod builder;
pub mod profiles;

use std::path::Path;

use thiserror::Error;

use gaseous_core::error::BoxError;
use gaseous_core::fingerprint::{FingerprintEngine, FingerprintParams, FingerprintSpec};

#[derive(Debug, Error)]
pub enum SpecDbError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("spec JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Counters returned by [`SpecDb::load_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: u64,
    pub skipped: u64,
}

/// An owned, enumerable spec database. Construction and import are the
/// only mutations; once handed to the codec it is only ever read.
pub struct SpecDb {
    specs: Vec<FingerprintSpec>,
}

impl SpecDb {
    /// The builtin profile table.
    pub fn builtin() -> Self {
        Self {
            specs: profiles::builtin(),
        }
    }

    /// An empty database; useful with [`SpecDb::load_json`] alone.
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    pub fn with_specs(specs: Vec<FingerprintSpec>) -> Self {
        Self { specs }
    }

    /// Import additional specs from a JSON array file. Additive: entries
    /// with an empty id or an id already present are skipped, not
    /// replaced.
    pub fn load_json(&mut self, path: &Path) -> Result<ImportStats, SpecDbError> {
        let file = std::fs::File::open(path).map_err(|e| SpecDbError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let entries: Vec<FingerprintSpec> =
            serde_json::from_reader(std::io::BufReader::new(file))?;

        let mut imported = 0u64;
        let mut skipped = 0u64;
        for entry in entries {
            if entry.id.is_empty() || self.specs.iter().any(|s| s.id == entry.id) {
                skipped += 1;
                continue;
            }
            self.specs.push(entry);
            imported += 1;
        }
        Ok(ImportStats { imported, skipped })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FingerprintEngine for SpecDb {
    fn specs(&self) -> &[FingerprintSpec] {
        &self.specs
    }

    fn build_client_hello(&self, params: &FingerprintParams) -> Result<Vec<u8>, BoxError> {
        let spec = self
            .spec(&params.spec_id)
            .ok_or_else(|| builder::BuildError::UnknownSpec(params.spec_id.clone()))?;
        builder::build_client_hello(spec, params).map_err(Into::into)
    }
}
