//! Transparent gunzip for `*.gz` payloads.

use crate::error::{FetchError, Result};
use flate2::read::GzDecoder;
use std::io::Read;

/// Decompresses a gzip payload fetched from `uri`.
///
/// Bytes that are not valid gzip mean the server sent something other than it
/// claimed, so this fails with `CorruptServerResponse` rather than a transport
/// error.
pub fn gunzip(data: &[u8], uri: &str) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| FetchError::CorruptServerResponse {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
    Ok(out)
}
