use crate::header::{ext_from_doctype, HeaderFields};
use crate::signature::SignatureKind;

/// One reconstructed file, possibly assembled from several blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalFileRecord {
    /// `None` for anonymous records.
    pub guid: Option<String>,
    pub name: String,
    pub ext:  String,
    /// Declared SHA-1, hex.  Empty means unverified.
    pub hash: String,
    /// Always `data.len()` once decoding finishes.
    pub size: usize,
    pub data: Vec<u8>,
    /// Type detected from the payload signature.
    pub kind: Option<SignatureKind>,
}

impl LogicalFileRecord {
    pub fn with_guid(guid: impl Into<String>) -> Self {
        Self { guid: Some(guid.into()), ..Self::default() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.guid.is_none()
    }

    /// Fold metadata into the record.  Empty values never clear a field, and
    /// a doctype only fills `ext` while it is still empty.
    pub fn merge(&mut self, fields: &HeaderFields) {
        if !fields.name.is_empty() {
            self.name = fields.name.clone();
        }
        if !fields.ext.is_empty() {
            self.ext = fields.ext.clone();
        }
        if !fields.hash.is_empty() {
            self.hash = fields.hash.clone();
        }
        if self.ext.is_empty() {
            if let Some(ext) = ext_from_doctype(&fields.doctype) {
                self.ext = ext.to_owned();
            }
        }
    }

    pub fn append(&mut self, bytes: &[u8], kind: Option<SignatureKind>) {
        if self.kind.is_none() {
            self.kind = kind;
        }
        self.data.extend_from_slice(bytes);
    }

    /// Recompute `size` and fall back to the detected type for `ext`.
    pub fn finalize(&mut self) {
        self.size = self.data.len();
        if self.ext.is_empty() {
            if let Some(kind) = self.kind {
                self.ext = kind.extension().to_owned();
            }
        }
    }

    pub fn verify(&self) -> bool {
        crate::verify::verify_sha1(self)
    }
}
