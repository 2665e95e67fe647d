//! Assembly engine: rebuild logical files from a `.env` container blob.
//!
//! # How it works
//!
//! The blob is split on the `**%%` separator and the blocks are walked in
//! order.  Each block is either
//!
//! - **binary**: spliced down to its first known signature and appended to
//!   the current target;
//! - **metadata**: `KEY/value` lines.  A `GUID/` line re-anchors the current
//!   target on that GUID's record; metadata without a GUID decorates the
//!   current target, or starts a fresh anonymous one;
//! - **neither**: rescued as payload when a signature occurs anywhere in it,
//!   otherwise dropped.
//!
//! The current target is a single cursor into the record arena.  Only
//! metadata blocks move it.  A binary fragment that arrives while no target
//! is active becomes its own anonymous record and leaves the cursor unset.
//!
//! Records are kept in first-seen order.  Nothing about a malformed block is
//! an error; only blob-level conditions are.
//!
//! # Single-record layout
//!
//! A blob opening with `FILENAME/` is the single-record layout (three header
//! lines then payload) and bypasses the block walk entirely.

use std::collections::HashMap;

use thiserror::Error;

use crate::block::{looks_binary, split_blocks, RawBlock, DEFAULT_BINARY_THRESHOLD};
use crate::header::{extract_fields, is_simple_layout, parse_simple, HeaderError, HeaderFields};
use crate::record::LogicalFileRecord;
use crate::signature::{detect_prefix, locate, SignatureKind};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty input")]
    Empty,
    #[error("{0}")]
    InvalidHeader(#[from] HeaderError),
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Configuration for [`decode_with`].
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Blocks whose printable-byte ratio falls below this are payload.
    pub binary_threshold: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { binary_threshold: DEFAULT_BINARY_THRESHOLD }
    }
}

// ── Report types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `FILENAME/` header followed by one payload.
    Simple,
    /// Separator-delimited blocks.
    Blocks,
}

/// What the engine did with one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDisposition {
    /// Blank after whitespace trimming.
    Empty,
    /// Metadata merged into `record`.
    Metadata { record: usize },
    /// Binary block appended to `record`; `skipped` leading bytes dropped.
    Payload { record: usize, kind: Option<SignatureKind>, skipped: usize },
    /// Text block with no usable field whose embedded payload was recovered.
    Rescued { record: usize, kind: SignatureKind, skipped: usize },
    /// No field and no signature.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct BlockEntry {
    pub index:       usize,
    pub offset:      usize,
    pub len:         usize,
    pub disposition: BlockDisposition,
}

/// Result of [`decode_with`].
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub layout:  Layout,
    pub records: Vec<LogicalFileRecord>,
    /// Per-block log.  Empty for [`Layout::Simple`].
    pub blocks:  Vec<BlockEntry>,
}

impl DecodeReport {
    pub fn count(&self, pred: impl Fn(&BlockDisposition) -> bool) -> usize {
        self.blocks.iter().filter(|b| pred(&b.disposition)).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{:?} layout: {} block(s), {} metadata, {} payload, {} rescued, {} discarded, \
             {} file(s) reconstructed",
            self.layout,
            self.blocks.len(),
            self.count(|d| matches!(d, BlockDisposition::Metadata { .. })),
            self.count(|d| matches!(d, BlockDisposition::Payload { .. })),
            self.count(|d| matches!(d, BlockDisposition::Rescued { .. })),
            self.count(|d| matches!(d, BlockDisposition::Discarded)),
            self.records.len(),
        )
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Decode a whole container blob with default options.
pub fn decode(blob: &[u8]) -> Result<Vec<LogicalFileRecord>, DecodeError> {
    decode_with(blob, &DecodeOptions::default()).map(|r| r.records)
}

pub fn decode_with(blob: &[u8], opts: &DecodeOptions) -> Result<DecodeReport, DecodeError> {
    if blob.is_empty() {
        return Err(DecodeError::Empty);
    }
    let report = if is_simple_layout(blob) {
        decode_simple(blob)?
    } else {
        decode_blocks(blob, opts)
    };
    log::info!("{}", report.summary());
    Ok(report)
}

fn decode_simple(blob: &[u8]) -> Result<DecodeReport, DecodeError> {
    let header = parse_simple(blob)?;
    let mut record = LogicalFileRecord {
        name: header.name,
        ext:  header.ext,
        hash: header.hash,
        ..LogicalFileRecord::anonymous()
    };
    record.append(header.payload, detect_prefix(header.payload));
    record.finalize();
    Ok(DecodeReport { layout: Layout::Simple, records: vec![record], blocks: Vec::new() })
}

fn decode_blocks(blob: &[u8], opts: &DecodeOptions) -> DecodeReport {
    let mut asm = Assembler::default();
    let blocks: Vec<BlockEntry> = split_blocks(blob)
        .into_iter()
        .map(|block| {
            let disposition = asm.feed(&block, opts.binary_threshold);
            log::debug!(
                "block {} @{} ({} B): {:?}",
                block.index, block.offset, block.bytes.len(), disposition
            );
            BlockEntry {
                index:  block.index,
                offset: block.offset,
                len:    block.bytes.len(),
                disposition,
            }
        })
        .collect();
    DecodeReport { layout: Layout::Blocks, records: asm.finish(), blocks }
}

// ── Assembler ─────────────────────────────────────────────────────────────────

/// Per-decode state.  Built fresh for every blob.
#[derive(Debug, Default)]
struct Assembler {
    records: Vec<LogicalFileRecord>,
    by_guid: HashMap<String, usize>,
    cursor:  Option<usize>,
}

impl Assembler {
    fn feed(&mut self, block: &RawBlock<'_>, threshold: f64) -> BlockDisposition {
        if block.is_blank() {
            return BlockDisposition::Empty;
        }

        if looks_binary(block.bytes, threshold) {
            let (record, kind, skipped) = self.attach(block.bytes);
            return BlockDisposition::Payload { record, kind, skipped };
        }

        let fields = extract_fields(block.bytes);
        if !fields.is_empty() {
            let record = self.decorate(&fields);
            return BlockDisposition::Metadata { record };
        }

        match locate(block.bytes) {
            Some(hit) => {
                let (record, _, _) = self.attach(&block.bytes[hit.offset..]);
                BlockDisposition::Rescued { record, kind: hit.kind, skipped: hit.offset }
            }
            None => BlockDisposition::Discarded,
        }
    }

    /// Merge metadata, re-anchoring the cursor on a GUID when one is given.
    fn decorate(&mut self, fields: &HeaderFields) -> usize {
        let idx = if !fields.guid.is_empty() {
            let idx = self.get_or_create(&fields.guid);
            self.cursor = Some(idx);
            idx
        } else if let Some(idx) = self.cursor {
            idx
        } else {
            let idx = self.push(LogicalFileRecord::anonymous());
            self.cursor = Some(idx);
            idx
        };
        self.records[idx].merge(fields);
        idx
    }

    /// Append payload to the current target.  Leading bytes before the first
    /// signature are dropped; without a signature the whole slice is kept.
    fn attach(&mut self, bytes: &[u8]) -> (usize, Option<SignatureKind>, usize) {
        let hit = locate(bytes);
        let skipped = hit.map_or(0, |h| h.offset);
        let kind = hit.map(|h| h.kind);
        let idx = match self.cursor {
            Some(idx) => idx,
            None => self.push(LogicalFileRecord::anonymous()),
        };
        self.records[idx].append(&bytes[skipped..], kind);
        (idx, kind, skipped)
    }

    fn get_or_create(&mut self, guid: &str) -> usize {
        if let Some(&idx) = self.by_guid.get(guid) {
            return idx;
        }
        let idx = self.push(LogicalFileRecord::with_guid(guid));
        self.by_guid.insert(guid.to_owned(), idx);
        idx
    }

    fn push(&mut self, record: LogicalFileRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    fn finish(mut self) -> Vec<LogicalFileRecord> {
        for r in &mut self.records {
            r.finalize();
        }
        self.records
    }
}
