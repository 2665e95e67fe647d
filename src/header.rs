//! Line-oriented `KEY/value` metadata found in textual blocks, and the
//! single-record header layout.
//!
//! The key vocabulary is fixed: `GUID/`, `FILENAME/`, `EXT/`, `SHA1/`,
//! `DOCTYPE/` (alias `TYPE/`) and `_SIG/`.  `_SIG/` is a producer marker and
//! carries nothing.  Anything else is skipped; the format has no strict
//! schema and producers are noisy.

use thiserror::Error;

pub const KEY_GUID:     &str = "GUID/";
pub const KEY_FILENAME: &str = "FILENAME/";
pub const KEY_EXT:      &str = "EXT/";
pub const KEY_SHA1:     &str = "SHA1/";
pub const KEY_DOCTYPE:  &str = "DOCTYPE/";
pub const KEY_TYPE:     &str = "TYPE/";
pub const KEY_SIG:      &str = "_SIG/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Invalid header: expected FILENAME/, EXT/ and SHA1/ lines followed by payload")]
    Invalid,
}

// ── HeaderFields ─────────────────────────────────────────────────────────────

/// Fields extracted from one textual block.  Absent keys stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub guid:    String,
    pub name:    String,
    pub ext:     String,
    pub hash:    String,
    pub doctype: String,
}

impl HeaderFields {
    /// Any field other than the GUID is set.
    pub fn has_metadata(&self) -> bool {
        !(self.name.is_empty() && self.ext.is_empty() && self.hash.is_empty() && self.doctype.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.guid.is_empty() && !self.has_metadata()
    }
}

/// CRLF to LF, NUL bytes dropped, invalid UTF-8 replaced.
pub fn sanitize_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace("\r\n", "\n")
        .replace('\0', "")
}

/// Extract the known fields from a textual block.  Last occurrence of a key
/// wins.
pub fn extract_fields(bytes: &[u8]) -> HeaderFields {
    let text = sanitize_text(bytes);
    let mut fields = HeaderFields::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let slot = if let Some(v) = line.strip_prefix(KEY_GUID) {
            Some((&mut fields.guid, v))
        } else if let Some(v) = line.strip_prefix(KEY_FILENAME) {
            Some((&mut fields.name, v))
        } else if let Some(v) = line.strip_prefix(KEY_EXT) {
            Some((&mut fields.ext, v))
        } else if let Some(v) = line.strip_prefix(KEY_SHA1) {
            Some((&mut fields.hash, v))
        } else if let Some(v) = line.strip_prefix(KEY_DOCTYPE).or_else(|| line.strip_prefix(KEY_TYPE)) {
            Some((&mut fields.doctype, v))
        } else {
            // `_SIG/` and unknown keys.
            None
        };
        if let Some((field, value)) = slot {
            *field = value.trim().to_owned();
        }
    }
    fields
}

/// Extension implied by a `DOCTYPE/` value, or `None`.
pub fn ext_from_doctype(doctype: &str) -> Option<&'static str> {
    let dt = doctype.to_ascii_uppercase();
    if ["IMAGE", "IMAG", "JPG", "JPEG"].iter().any(|k| dt.contains(k)) {
        Some("jpg")
    } else if dt.contains("PNG") {
        Some("png")
    } else if dt.contains("PDF") {
        Some("pdf")
    } else {
        None
    }
}

// ── Single-record layout ─────────────────────────────────────────────────────

/// Blob that opens with `FILENAME/` and carries exactly one file.
pub fn is_simple_layout(blob: &[u8]) -> bool {
    blob.starts_with(KEY_FILENAME.as_bytes())
}

/// Parsed single-record blob: three header lines, then raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleHeader<'a> {
    pub name:    String,
    pub ext:     String,
    pub hash:    String,
    pub payload: &'a [u8],
}

/// Split a `FILENAME/…\nEXT/…\nSHA1/…\n<payload>` blob.  A header line whose
/// key does not match its position leaves that field empty.
pub fn parse_simple(blob: &[u8]) -> Result<SimpleHeader<'_>, HeaderError> {
    let mut parts = blob.splitn(4, |&b| b == b'\n');
    let (Some(l0), Some(l1), Some(l2), Some(payload)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HeaderError::Invalid);
    };
    Ok(SimpleHeader {
        name: line_value(l0, KEY_FILENAME),
        ext:  line_value(l1, KEY_EXT),
        hash: line_value(l2, KEY_SHA1),
        payload,
    })
}

fn line_value(line: &[u8], key: &str) -> String {
    line.strip_prefix(key.as_bytes())
        .map(|v| String::from_utf8_lossy(v).trim().to_owned())
        .unwrap_or_default()
}
