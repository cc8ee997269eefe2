//! Atomic file population for cache entries.
//!
//! Bytes are written to a uniquely named `.part` file beside the final path
//! and renamed into place, so a cache entry either does not exist or is
//! complete. Concurrent writers of the same entry each use their own temp
//! file; the last rename wins.

use crate::error::{FetchError, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

fn temp_beside(final_path: &Path) -> Result<NamedTempFile> {
    let dir = match final_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| FetchError::io(dir, e))
}

fn finalize(temp: NamedTempFile, final_path: &Path) -> Result<()> {
    temp.as_file()
        .sync_all()
        .map_err(|e| FetchError::io(temp.path(), e))?;
    temp.persist(final_path)
        .map_err(|e| FetchError::io(final_path, e.error))?;
    Ok(())
}

/// Writes `data` to `final_path` atomically.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> Result<()> {
    let mut temp = temp_beside(final_path)?;
    temp.write_all(data)
        .map_err(|e| FetchError::io(temp.path(), e))?;
    finalize(temp, final_path)
}

/// Copies `source` to `final_path` atomically. Returns the bytes copied.
pub fn copy_atomic(source: &Path, final_path: &Path) -> Result<u64> {
    let mut src = File::open(source).map_err(|e| FetchError::io(source, e))?;
    let mut temp = temp_beside(final_path)?;
    let n = io::copy(&mut src, &mut temp).map_err(|e| FetchError::io(source, e))?;
    finalize(temp, final_path)?;
    Ok(n)
}
