//! Signature table: leading byte patterns of the payload types the `.env`
//! container is known to carry.
//!
//! The table is process-wide constant data.  It is used twice by the
//! decoder: to splice a noisy binary block down to its payload, and to
//! rescue payload out of a block that yielded no metadata at all.
//!
//! # Tie-break
//! When several signatures match at the same lowest offset, the longest
//! signature wins; remaining ties go to the entry listed first.  No entry of
//! [`SIGNATURES`] is a prefix of another, so with the built-in table a tie
//! cannot occur.

use serde::{Deserialize, Serialize};

// ── SignatureKind ────────────────────────────────────────────────────────────

/// Payload type detected from a leading signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Jpg,
    Png,
    Gif,
    Webp,
    Pdf,
    Zip,
    Xml,
    Bmp,
}

impl SignatureKind {
    /// Type tag as reported on a decoded record.
    pub fn tag(self) -> &'static str {
        match self {
            SignatureKind::Jpg  => "jpg",
            SignatureKind::Png  => "png",
            SignatureKind::Gif  => "gif",
            SignatureKind::Webp => "webp",
            SignatureKind::Pdf  => "pdf",
            SignatureKind::Zip  => "zip",
            SignatureKind::Xml  => "xml",
            SignatureKind::Bmp  => "bmp",
        }
    }

    /// File extension used when a record carries no explicit `EXT/`.
    pub fn extension(self) -> &'static str {
        self.tag()
    }
}

impl std::fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Table ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub kind:  SignatureKind,
    pub magic: &'static [u8],
}

pub const SIGNATURES: &[Signature] = &[
    Signature { kind: SignatureKind::Jpg,  magic: &[0xFF, 0xD8, 0xFF] },
    Signature { kind: SignatureKind::Png,  magic: &[0x89, b'P', b'N', b'G'] },
    Signature { kind: SignatureKind::Gif,  magic: b"GIF8" },
    Signature { kind: SignatureKind::Webp, magic: b"RIFF" },
    Signature { kind: SignatureKind::Pdf,  magic: b"%PDF" },
    Signature { kind: SignatureKind::Zip,  magic: &[b'P', b'K', 0x03, 0x04] },
    Signature { kind: SignatureKind::Xml,  magic: b"<?xml" },
    Signature { kind: SignatureKind::Bmp,  magic: b"BM" },
];

/// A signature hit inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureMatch {
    pub offset: usize,
    pub kind:   SignatureKind,
}

// ── Locator ──────────────────────────────────────────────────────────────────

/// Lowest offset in `buf` at which any built-in signature occurs.
pub fn locate(buf: &[u8]) -> Option<SignatureMatch> {
    locate_in(SIGNATURES, buf)
}

/// Same as [`locate`] against an arbitrary table.
pub fn locate_in(table: &[Signature], buf: &[u8]) -> Option<SignatureMatch> {
    (0..buf.len()).find_map(|offset| {
        best_at(table, &buf[offset..]).map(|kind| SignatureMatch { offset, kind })
    })
}

/// Type of a buffer that begins exactly with a known signature.
pub fn detect_prefix(buf: &[u8]) -> Option<SignatureKind> {
    best_at(SIGNATURES, buf)
}

fn best_at(table: &[Signature], tail: &[u8]) -> Option<SignatureKind> {
    let mut best: Option<&Signature> = None;
    for sig in table {
        if sig.magic.is_empty() || !tail.starts_with(sig.magic) {
            continue;
        }
        // Strictly longer only, so earlier entries keep equal-length ties.
        if best.map_or(true, |b| sig.magic.len() > b.magic.len()) {
            best = Some(sig);
        }
    }
    best.map(|s| s.kind)
}
