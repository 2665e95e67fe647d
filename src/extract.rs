//! Write decoded records to a destination directory.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::LogicalFileRecord;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Cannot create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Record {position} would overwrite reserved file {}", path.display())]
    Reserved { path: PathBuf, position: usize },
}

/// Filesystem-safe path for `record`, relative to the output directory.
///
/// Both `/` and `\` separate components; empty, `.` and `..` components are
/// dropped, so the result never escapes the destination.  An unnamed record
/// becomes `block-NNN` after its `position`.  `ext` is appended when the
/// name has none.
pub fn output_path(record: &LogicalFileRecord, position: usize) -> PathBuf {
    let mut rel = PathBuf::new();
    for part in record.name.split(['/', '\\']).map(str::trim) {
        if matches!(part, "" | "." | "..") {
            continue;
        }
        rel.push(sanitize_component(part));
    }
    if rel.as_os_str().is_empty() {
        rel.push(format!("block-{position:03}"));
    }

    let ext = record.ext.trim().trim_start_matches('.');
    if rel.extension().is_none() && !ext.is_empty() {
        let mut s = rel.into_os_string();
        s.push(".");
        s.push(sanitize_component(ext));
        rel = PathBuf::from(s);
    }
    rel
}

fn sanitize_component(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Write every record under `dest`, creating directories as needed.
///
/// Stops at the first failure; files after it are not attempted.  Returns
/// the written paths (joined onto `dest`) in record order.  Records that map
/// to the same path overwrite each other; the later one wins.
pub fn write_records(records: &[LogicalFileRecord], dest: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut written = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();
    for (position, record) in records.iter().enumerate() {
        let path = dest.join(output_path(record, position));
        if !seen.insert(path.clone()) {
            log::warn!("record {position} overwrites {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ExtractError::CreateDir { path: parent.to_owned(), source })?;
        }
        fs::write(&path, &record.data)
            .map_err(|source| ExtractError::Write { path: path.clone(), source })?;
        log::debug!("wrote {} ({} B)", path.display(), record.data.len());
        written.push(path);
    }
    Ok(written)
}
