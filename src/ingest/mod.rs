pub mod decode;
pub mod parse;

pub use decode::{decode, Decoded};
pub use parse::{parse_delimited, ParsedTable};

use std::{fs, path::Path};
use tracing::{debug, warn};

use crate::config::IngestConfig;
use crate::error::DecodeError;
use crate::table::RecordSet;

/// Read `path`, decode it and parse it into a record set.
///
/// An empty record set is a valid result; callers treat it as "nothing to do".
#[tracing::instrument(level = "debug", skip(path, config), fields(path = %path.display()))]
pub fn read_file(path: &Path, config: &IngestConfig) -> Result<RecordSet, DecodeError> {
    let bytes = fs::read(path).map_err(|source| DecodeError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode(&bytes, &config.encodings)?;
    if decoded.fallback {
        warn!(
            path = %path.display(),
            replaced = decoded.replaced,
            "no candidate encoding matched, decoded with lossy single-byte fallback"
        );
    } else {
        debug!(encoding = decoded.encoding.name(), "decoded");
    }

    let parsed = parse_delimited(&decoded.text, config.delimiter);
    if parsed.skipped_lines > 0 {
        warn!(
            path = %path.display(),
            skipped = parsed.skipped_lines,
            "skipped malformed lines"
        );
    }
    Ok(parsed.records)
}
