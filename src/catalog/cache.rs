//! On-disk cache of the last good catalog snapshot.
//!
//! The file is a zstd-compressed JSON envelope. The catalog payload is kept
//! as a JSON string next to its SHA-256 fingerprint so a truncated or edited
//! cache is detected before it is trusted.

use std::fs;
use std::io;
use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Catalog, CatalogData, CatalogError};

const COMPRESSION_LEVEL: i32 = 3;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    fetched_at: Timestamp,
    fingerprint: String,
    data: String,
}

pub struct CatalogCache {
    path: PathBuf,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the cached snapshot, or `None` when there is no cache file.
    pub fn load(&self) -> Result<Option<Catalog>, CatalogError> {
        let compressed = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let json = zstd::decode_all(compressed.as_slice())?;
        let envelope: Envelope = serde_json::from_slice(&json)?;

        let found = fingerprint(envelope.data.as_bytes());
        if found != envelope.fingerprint {
            return Err(CatalogError::FingerprintMismatch {
                expected: envelope.fingerprint,
                found,
            });
        }
        let data: CatalogData = serde_json::from_str(&envelope.data)?;
        Ok(Some(Catalog::new(data, envelope.fetched_at)))
    }

    /// Like [`load`](Self::load), but any failure is logged and treated as a miss.
    pub fn load_or_empty(&self) -> Catalog {
        match self.load() {
            Ok(Some(catalog)) => catalog,
            Ok(None) => Catalog::empty(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable catalog cache");
                Catalog::empty()
            }
        }
    }

    /// Writes the snapshot. Catalogs that were never fetched are skipped.
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let Some(fetched_at) = catalog.fetched_at() else {
            return Ok(());
        };
        let data = serde_json::to_string(&catalog.to_data())?;
        let envelope = Envelope {
            fetched_at,
            fingerprint: fingerprint(data.as_bytes()),
            data,
        };
        let json = serde_json::to_vec(&envelope)?;
        let compressed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, compressed)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
