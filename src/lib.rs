pub mod signature;
pub mod block;
pub mod header;
pub mod record;
pub mod assembly;
pub mod verify;
pub mod extract;
pub mod manifest;
pub mod archive;

pub use signature::{SignatureKind, SignatureMatch, locate};
pub use block::{SEPARATOR, looks_binary, split_blocks};
pub use header::{HeaderFields, extract_fields, ext_from_doctype};
pub use record::LogicalFileRecord;
pub use assembly::{DecodeError, DecodeOptions, DecodeReport, decode, decode_with};
pub use verify::{Verification, verify_sha1};
pub use archive::{ArchiveError, EnvArchive, ExtractOptions};
