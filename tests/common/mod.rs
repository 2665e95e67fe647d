//! Blob fixtures shared by the test files.

#![allow(dead_code)]

use envunpack::block::SEPARATOR;

/// PNG header followed by high-bit filler; well under the printable ratio.
pub fn png_bytes() -> Vec<u8> {
    let mut v = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    v.extend(0x80u8..0xC0);
    v
}

/// JPEG start-of-image followed by high-bit filler.
pub fn jpeg_bytes() -> Vec<u8> {
    let mut v = vec![0xFF, 0xD8, 0xFF, 0xE0];
    v.extend(0x90u8..0xD0);
    v
}

/// Leading bytes a producer may leave in front of a payload.
pub const NOISE: &[u8] = &[0x00, 0x01, 0x02, 0x03, 0x07];

/// Join blocks with the separator, with a leading and trailing separator.
pub fn container(blocks: &[&[u8]]) -> Vec<u8> {
    let mut out = SEPARATOR.to_vec();
    for b in blocks {
        out.extend_from_slice(b);
        out.extend_from_slice(&SEPARATOR);
    }
    out
}

pub fn with_noise(payload: &[u8]) -> Vec<u8> {
    let mut v = NOISE.to_vec();
    v.extend_from_slice(payload);
    v
}
