//! Cache directory selection.

use std::fs;
use std::path::{Path, PathBuf};

/// Picks the cache directory for `install_dir`.
///
/// - `install_dir` itself when the working directory is `install_dir`;
/// - `install_dir/cache` when it is writable, or when it does not exist yet
///   and `install_dir` is writable;
/// - `user_cache_dir` otherwise.
pub fn select_cache_dir(install_dir: &Path, cwd: Option<&Path>, user_cache_dir: &Path) -> PathBuf {
    if cwd.is_some_and(|c| same_dir(c, install_dir)) {
        return install_dir.to_path_buf();
    }
    let install_cache = install_dir.join("cache");
    if is_writable(&install_cache) || (is_writable(install_dir) && !install_cache.exists()) {
        return install_cache;
    }
    user_cache_dir.to_path_buf()
}

/// Creates `dir` if missing. Failure is logged and otherwise ignored; a
/// directory that truly cannot exist makes the later write fail instead.
pub fn ensure_dir(dir: &Path) {
    if dir.exists() {
        return;
    }
    if let Err(e) = fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "could not create cache directory");
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether the current user may write to `path`. Missing paths are not writable.
#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
