//! [`EnvArchive`]: open a container, list and verify its files, extract them.
//!
//! ```no_run
//! use envunpack::archive::{EnvArchive, ExtractOptions};
//!
//! let ar = EnvArchive::open("bundle.env")?;
//! for v in ar.verify() {
//!     println!("{} ({} B) ok={}", v.name, v.size, v.ok);
//! }
//! for f in ar.extract_all("out", &ExtractOptions::default())? {
//!     println!("{} ok={}", f.path.display(), f.verified);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assembly::{decode_with, DecodeError, DecodeOptions, DecodeReport};
use crate::extract::{output_path, write_records, ExtractError};
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};
use crate::record::LogicalFileRecord;
use crate::verify::{verify_all, Verification};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

// ── ExtractOptions ────────────────────────────────────────────────────────────

/// Configuration for [`EnvArchive::extract_all`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Also write `manifest.json` into the destination.
    pub manifest: bool,
}

// ── ExtractedFile ─────────────────────────────────────────────────────────────

/// One written file and its verification verdict.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub path:     PathBuf,
    pub size:     usize,
    pub verified: bool,
}

// ── EnvArchive ────────────────────────────────────────────────────────────────

pub struct EnvArchive {
    path:   Option<PathBuf>,
    report: DecodeReport,
}

impl EnvArchive {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        Self::open_with(path, &DecodeOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, opts: &DecodeOptions) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_owned();
        let blob = fs::read(&path)
            .map_err(|source| ArchiveError::Read { path: path.clone(), source })?;
        log::info!("read {} ({} B)", path.display(), blob.len());
        let mut ar = Self::from_bytes(&blob, opts)?;
        ar.path = Some(path);
        Ok(ar)
    }

    pub fn from_bytes(blob: &[u8], opts: &DecodeOptions) -> Result<Self, ArchiveError> {
        let report = decode_with(blob, opts)?;
        Ok(Self { path: None, report })
    }

    // ── Read ──────────────────────────────────────────────────────────────────

    pub fn records(&self) -> &[LogicalFileRecord] {
        &self.report.records
    }

    pub fn into_records(self) -> Vec<LogicalFileRecord> {
        self.report.records
    }

    pub fn report(&self) -> &DecodeReport {
        &self.report
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn verify(&self) -> Vec<Verification> {
        verify_all(self.records())
    }

    // ── Extract ───────────────────────────────────────────────────────────────

    /// Write all records under `dest`, creating it if necessary, then verify
    /// each one.  A hash mismatch is reported, never raised.  With
    /// `opts.manifest`, a record that would land on the manifest file is
    /// refused before anything is written.
    pub fn extract_all<P: AsRef<Path>>(
        &self,
        dest: P,
        opts: &ExtractOptions,
    ) -> Result<Vec<ExtractedFile>, ArchiveError> {
        let dest = dest.as_ref();
        fs::create_dir_all(dest)
            .map_err(|source| ExtractError::CreateDir { path: dest.to_owned(), source })?;

        let records = self.records();
        if opts.manifest {
            let reserved = Path::new(MANIFEST_FILE_NAME);
            let clash = (0..records.len()).find(|&i| output_path(&records[i], i) == reserved);
            if let Some(position) = clash {
                return Err(ExtractError::Reserved { path: dest.join(reserved), position }.into());
            }
        }
        let written = write_records(records, dest)?;

        let files: Vec<ExtractedFile> = written
            .iter()
            .zip(records)
            .map(|(path, r)| ExtractedFile { path: path.clone(), size: r.size, verified: r.verify() })
            .collect();

        if opts.manifest {
            let rel: Vec<PathBuf> = written
                .iter()
                .map(|p| p.strip_prefix(dest).unwrap_or(p).to_owned())
                .collect();
            let manifest = Manifest::build(self.path(), records, &rel);
            let path = dest.join(MANIFEST_FILE_NAME);
            fs::write(&path, manifest.to_bytes()?)
                .map_err(|source| ExtractError::Write { path, source })?;
        }

        log::info!("extracted {} file(s) to {}", files.len(), dest.display());
        Ok(files)
    }
}
