use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::record::LogicalFileRecord;
use crate::signature::SignatureKind;
use crate::verify::{sha1_hex, verify_sha1};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Output path relative to the extraction directory.
    pub path:          String,
    #[serde(default)]
    pub guid:          Option<String>,
    pub ext:           String,
    #[serde(default)]
    pub kind:          Option<SignatureKind>,
    pub size:          usize,
    /// Empty when the container declared no hash.
    #[serde(default)]
    pub declared_sha1: String,
    pub computed_sha1: String,
    pub verified:      bool,
}

/// Summary of one extraction run, written next to the extracted files.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Manifest {
    #[serde(default)]
    pub source:       Option<String>,
    /// RFC 3339, UTC.
    pub extracted_at: String,
    pub files:        Vec<ManifestEntry>,
}

impl Manifest {
    /// `paths[i]` is where `records[i]` was written, relative to `dest`.
    pub fn build(source: Option<&Path>, records: &[LogicalFileRecord], paths: &[PathBuf]) -> Self {
        let files = records
            .iter()
            .zip(paths)
            .map(|(r, p)| ManifestEntry {
                path:          p.to_string_lossy().replace('\\', "/"),
                guid:          r.guid.clone(),
                ext:           r.ext.clone(),
                kind:          r.kind,
                size:          r.size,
                declared_sha1: r.hash.trim().to_ascii_lowercase(),
                computed_sha1: sha1_hex(&r.data),
                verified:      verify_sha1(r),
            })
            .collect();
        Self {
            source:       source.map(|p| p.display().to_string()),
            extracted_at: Utc::now().to_rfc3339(),
            files,
        }
    }

    pub fn all_verified(&self) -> bool {
        self.files.iter().all(|f| f.verified)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
