//! Block framing and the text/binary classifier.
//!
//! A container blob is a flat run of blocks separated by [`SEPARATOR`].
//! There is no length field and no escaping, so a separator that happens to
//! occur inside a payload splits it like any other.

/// Block delimiter `**%%`.
pub const SEPARATOR: [u8; 4] = [0x2A, 0x2A, 0x25, 0x25];

/// Printable ratio below which a block counts as binary payload.
pub const DEFAULT_BINARY_THRESHOLD: f64 = 0.6;

/// One separator-delimited segment of the blob.
#[derive(Debug, Clone, Copy)]
pub struct RawBlock<'a> {
    pub index:  usize,
    /// Byte offset of the first block byte within the blob.
    pub offset: usize,
    pub bytes:  &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Nothing but whitespace, vertical tab included.
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|&b| b.is_ascii_whitespace() || b == 0x0B)
    }
}

/// Split `blob` on every occurrence of [`SEPARATOR`], keeping empty
/// segments so block indices line up with separator positions.
pub fn split_blocks(blob: &[u8]) -> Vec<RawBlock<'_>> {
    let mut blocks = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i + SEPARATOR.len() <= blob.len() {
        if blob[i..i + SEPARATOR.len()] == SEPARATOR {
            blocks.push(RawBlock { index: blocks.len(), offset: start, bytes: &blob[start..i] });
            i += SEPARATOR.len();
            start = i;
        } else {
            i += 1;
        }
    }
    blocks.push(RawBlock { index: blocks.len(), offset: start, bytes: &blob[start..] });
    blocks
}

fn is_texty(b: u8) -> bool {
    matches!(b, 0x20..=0x7E | b'\n' | b'\r' | b'\t')
}

/// Share of bytes in `bytes` that are printable ASCII or `\n`, `\r`, `\t`.
pub fn printable_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 1.0;
    }
    let printable = bytes.iter().filter(|&&b| is_texty(b)).count();
    printable as f64 / bytes.len() as f64
}

/// `true` when the block is mostly binary.  Empty input is never binary.
pub fn looks_binary(bytes: &[u8], threshold: f64) -> bool {
    !bytes.is_empty() && printable_ratio(bytes) < threshold
}
