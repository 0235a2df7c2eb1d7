// 📂 Source boundary - bytes in, UTF-8 text out
// Size ceiling and ISO-8859-1 fallback live here so the engine only ever sees text.

use crate::error::AfdError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default ceiling for a single AFD file (50 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Read a whole source, refusing anything larger than `max_bytes`
pub fn read_bytes<R: Read>(reader: R, max_bytes: Option<u64>) -> Result<Vec<u8>, AfdError> {
    let mut bytes = Vec::new();

    match max_bytes {
        Some(limit) => {
            reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
            if bytes.len() as u64 > limit {
                return Err(AfdError::TooLarge { limit });
            }
        }
        None => {
            let mut reader = reader;
            reader.read_to_end(&mut bytes)?;
        }
    }

    Ok(bytes)
}

/// UTF-8 when valid, otherwise ISO-8859-1 (every byte maps to the same code point)
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("source is not UTF-8, decoding as ISO-8859-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

pub fn read_source<R: Read>(reader: R, max_bytes: Option<u64>) -> Result<String, AfdError> {
    read_bytes(reader, max_bytes).map(decode)
}

pub fn read_path(path: &Path, max_bytes: Option<u64>) -> Result<String, AfdError> {
    let file = File::open(path)?;
    read_source(file, max_bytes)
}

// ============================================================================
// TESTS
// ============================================================================
