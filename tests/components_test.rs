use envunpack::block::{looks_binary, printable_ratio, split_blocks, DEFAULT_BINARY_THRESHOLD};
use envunpack::header::{extract_fields, ext_from_doctype, parse_simple, HeaderError};
use envunpack::record::LogicalFileRecord;
use envunpack::signature::{detect_prefix, locate, locate_in, Signature, SignatureKind, SIGNATURES};
use envunpack::verify::{sha1_hex, verify_all, verify_sha1};

const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

// ── Signatures ───────────────────────────────────────────────────────────────

#[test]
fn test_locate_finds_lowest_offset() {
    let mut buf = b"xx".to_vec();
    buf.extend_from_slice(b"%PDF-1.7 ");
    buf.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
    let hit = locate(&buf).unwrap();
    assert_eq!(hit.offset, 2);
    assert_eq!(hit.kind, SignatureKind::Pdf);
}

#[test]
fn test_locate_not_found() {
    assert_eq!(locate(b"plain lowercase text"), None);
    assert_eq!(locate(b""), None);
    // Truncated signature at the very end.
    assert_eq!(locate(&[0x00, 0xFF, 0xD8]), None);
}

#[test]
fn test_signature_at_start_is_offset_zero() {
    for sig in SIGNATURES {
        let mut buf = sig.magic.to_vec();
        buf.extend_from_slice(&[0x00; 16]);
        let hit = locate(&buf).unwrap();
        assert_eq!(hit.offset, 0, "{}", sig.kind);
        assert_eq!(hit.kind, sig.kind);
        assert_eq!(detect_prefix(&buf), Some(sig.kind));
    }
}

#[test]
fn test_builtin_table_has_no_prefix_overlap() {
    for a in SIGNATURES {
        for b in SIGNATURES {
            if a.kind != b.kind {
                assert!(!b.magic.starts_with(a.magic), "{} is a prefix of {}", a.kind, b.kind);
            }
        }
    }
}

#[test]
fn test_tie_break_prefers_longest_then_table_order() {
    let table = [
        Signature { kind: SignatureKind::Jpg, magic: b"AB" },
        Signature { kind: SignatureKind::Png, magic: b"ABC" },
        Signature { kind: SignatureKind::Gif, magic: b"AB" },
    ];
    let hit = locate_in(&table, b"xxABCD").unwrap();
    assert_eq!((hit.offset, hit.kind), (2, SignatureKind::Png));

    let hit = locate_in(&table, b"xxABx").unwrap();
    assert_eq!((hit.offset, hit.kind), (2, SignatureKind::Jpg));

    let reversed = [table[2], table[0]];
    assert_eq!(locate_in(&reversed, b"AB").unwrap().kind, SignatureKind::Gif);
}

// ── Blocks ───────────────────────────────────────────────────────────────────

#[test]
fn test_split_blocks_keeps_empty_segments() {
    let blocks = split_blocks(b"a**%%b**%%");
    let parts: Vec<&[u8]> = blocks.iter().map(|b| b.bytes).collect();
    let expected: [&[u8]; 3] = [b"a", b"b", b""];
    assert_eq!(parts, expected);
    let offsets: Vec<_> = blocks.iter().map(|b| b.offset).collect();
    assert_eq!(offsets, [0, 5, 10]);
}

#[test]
fn test_split_blocks_without_separator() {
    let blocks = split_blocks(b"**%no split");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].bytes, b"**%no split");
}

#[test]
fn test_classifier() {
    assert!(!looks_binary(b"", DEFAULT_BINARY_THRESHOLD));
    assert!(!looks_binary(b"GUID/abc\r\nFILENAME/x\t\n", DEFAULT_BINARY_THRESHOLD));

    let mut pdf = b"%PDF-".to_vec();
    pdf.extend(0x80u8..0x90);
    assert!(looks_binary(&pdf, DEFAULT_BINARY_THRESHOLD));

    // A little noise in metadata is tolerated.
    let mut noisy = b"GUID/abc\nFILENAME/photo.jpg\n".to_vec();
    noisy.extend_from_slice(&[0x00, 0x01, 0xFE]);
    assert!(!looks_binary(&noisy, DEFAULT_BINARY_THRESHOLD));
}

#[test]
fn test_classifier_threshold_is_strict() {
    let block = [b'a', b'b', b'c', 0x00, 0x01];
    assert_eq!(printable_ratio(&block), 0.6);
    assert!(!looks_binary(&block, 0.6));
    assert!(looks_binary(&block, 0.61));
}

// ── Header fields ────────────────────────────────────────────────────────────

#[test]
fn test_extract_fields() {
    let f = extract_fields(b"  GUID/ 1234 \nFILENAME/report.pdf\nEXT/pdf\nSHA1/ABC\nDOCTYPE/PDF\n");
    assert_eq!(f.guid, "1234");
    assert_eq!(f.name, "report.pdf");
    assert_eq!(f.ext, "pdf");
    assert_eq!(f.hash, "ABC");
    assert_eq!(f.doctype, "PDF");
}

#[test]
fn test_extract_fields_last_write_wins() {
    let f = extract_fields(b"FILENAME/one\nFILENAME/two\nTYPE/image\nDOCTYPE/pdf");
    assert_eq!(f.name, "two");
    assert_eq!(f.doctype, "pdf");
}

#[test]
fn test_extract_fields_skips_unknown() {
    let f = extract_fields(b"_SIG/xyz\nSIZE/12\nrandom line\n\n");
    assert!(f.is_empty());
    assert!(!f.has_metadata());
}

#[test]
fn test_guid_only_is_not_metadata() {
    let f = extract_fields(b"GUID/g");
    assert!(!f.is_empty());
    assert!(!f.has_metadata());
}

#[test]
fn test_ext_from_doctype() {
    assert_eq!(ext_from_doctype("image"), Some("jpg"));
    assert_eq!(ext_from_doctype("Imagen"), Some("jpg"));
    assert_eq!(ext_from_doctype("photo/jpeg"), Some("jpg"));
    assert_eq!(ext_from_doctype("PNG scan"), Some("png"));
    assert_eq!(ext_from_doctype("pdf"), Some("pdf"));
    assert_eq!(ext_from_doctype("spreadsheet"), None);
    assert_eq!(ext_from_doctype(""), None);
}

#[test]
fn test_parse_simple_tolerates_crlf_headers() {
    let h = parse_simple(b"FILENAME/x.bin\r\nEXT/bin\r\nSHA1/00\r\n\x01\x02").unwrap();
    assert_eq!(h.name, "x.bin");
    assert_eq!(h.ext, "bin");
    assert_eq!(h.hash, "00");
    assert_eq!(h.payload, b"\x01\x02");
}

#[test]
fn test_parse_simple_misplaced_key_leaves_field_empty() {
    let h = parse_simple(b"FILENAME/x\nSHA1/00\nEXT/bin\ndata").unwrap();
    assert_eq!(h.ext, "");
    assert_eq!(h.hash, "");
    assert_eq!(parse_simple(b"FILENAME/x\n"), Err(HeaderError::Invalid));
}

// ── Records & verification ───────────────────────────────────────────────────

fn record(hash: &str, data: &[u8]) -> LogicalFileRecord {
    let mut r = LogicalFileRecord { name: "f".into(), hash: hash.into(), ..Default::default() };
    r.append(data, None);
    r.finalize();
    r
}

#[test]
fn test_sha1_hex() {
    assert_eq!(sha1_hex(b"abc"), ABC_SHA1);
}

#[test]
fn test_verify_empty_hash_always_passes() {
    assert!(verify_sha1(&record("", b"anything")));
    assert!(verify_sha1(&record("   ", b"")));
}

#[test]
fn test_verify_matches_case_insensitively() {
    assert!(verify_sha1(&record(ABC_SHA1, b"abc")));
    assert!(verify_sha1(&record(&ABC_SHA1.to_uppercase(), b"abc")));
}

#[test]
fn test_verify_detects_corruption() {
    let mut corrupt = ABC_SHA1.to_string();
    corrupt.replace_range(0..1, "b");
    assert!(!verify_sha1(&record(&corrupt, b"abc")));
    assert!(!verify_sha1(&record(ABC_SHA1, b"abd")));
}

#[test]
fn test_verify_all_reports_every_record() {
    let records = vec![record(ABC_SHA1, b"abc"), record("deadbeef", b"abc"), record("", b"x")];
    let results = verify_all(&records);
    let oks: Vec<_> = results.iter().map(|v| v.ok).collect();
    assert_eq!(oks, [true, false, true]);
    assert_eq!(results[1].computed, ABC_SHA1);
    assert_eq!(results[1].size, 3);
}

#[test]
fn test_verification_names_match_output_paths() {
    let mut unnamed = record("", b"\xFF\xD8\xFF");
    unnamed.name.clear();
    unnamed.ext = "jpg".into();
    let named = LogicalFileRecord { name: "scan".into(), ext: ".png".into(), ..Default::default() };
    let results = verify_all(&[named, unnamed]);
    assert_eq!(results[0].name, "scan.png");
    assert_eq!(results[1].name, "block-001.jpg");
}

#[test]
fn test_finalize_recomputes_size() {
    let mut r = LogicalFileRecord { size: 999, ..Default::default() };
    r.append(&[1, 2, 3], Some(SignatureKind::Zip));
    r.append(&[4], Some(SignatureKind::Png));
    r.finalize();
    assert_eq!(r.size, 4);
    assert_eq!(r.kind, Some(SignatureKind::Zip));
    assert_eq!(r.ext, "zip");
}
