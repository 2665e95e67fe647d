//! SHA-1 integrity check of decoded records.
//!
//! A mismatch is advisory: it is reported per record and never stops a
//! decode or an extraction.

use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::extract::output_path;
use crate::record::LogicalFileRecord;

/// Lowercase hex SHA-1 of `data`.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// `true` when the record declares no hash or the declared hash matches
/// its payload (case-insensitive).
pub fn verify_sha1(record: &LogicalFileRecord) -> bool {
    let declared = record.hash.trim();
    declared.is_empty() || sha1_hex(&record.data).eq_ignore_ascii_case(declared)
}

/// Per-record verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Output path the record is extracted to, relative to the destination.
    pub name:     String,
    pub size:     usize,
    pub declared: String,
    pub computed: String,
    pub ok:       bool,
}

impl Verification {
    /// Check `r`, the record at `position` in decode order.
    pub fn new(r: &LogicalFileRecord, position: usize) -> Self {
        let name = output_path(r, position).display().to_string();
        let ok = verify_sha1(r);
        if !ok {
            log::warn!("sha1 mismatch for {name}: declared {}", r.hash.trim());
        }
        Verification {
            name,
            size:     r.size,
            declared: r.hash.trim().to_ascii_lowercase(),
            computed: sha1_hex(&r.data),
            ok,
        }
    }
}

/// Verify every record, in record order.
pub fn verify_all(records: &[LogicalFileRecord]) -> Vec<Verification> {
    records.iter().enumerate().map(|(i, r)| Verification::new(r, i)).collect()
}
