//! Cache resolver: turn a package descriptor and a source into a local file.
//!
//! Cache layout is flat: `<cache_dir>/<name>-<version>-<platform>.gem`, plus
//! `<name>-<version>.gem` for artifacts only published under the
//! platform-agnostic name.

mod descriptor;
mod dir;

pub use descriptor::{PackageDescriptor, ARTIFACT_EXT};
pub use dir::{ensure_dir, is_writable, select_cache_dir};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::{CurlTransport, Fetcher, Transport};
use crate::headers::HeaderSet;
use crate::source_uri::{Scheme, SourceUri};
use crate::storage;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves packages into a local cache, fetching or copying on a miss.
#[derive(Debug)]
pub struct CacheResolver<T: Transport = CurlTransport> {
    fetcher: Fetcher<T>,
    user_cache_dir: PathBuf,
}

impl CacheResolver<CurlTransport> {
    /// Curl-backed resolver using the configured timeouts, object-store
    /// endpoint and user cache directory.
    pub fn from_config(headers: HeaderSet, cfg: &FetchConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            Fetcher::with_config(headers, cfg),
            cfg.user_cache_dir()?,
        ))
    }
}

impl<T: Transport> CacheResolver<T> {
    pub fn new(fetcher: Fetcher<T>, user_cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            user_cache_dir: user_cache_dir.into(),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Returns a local path to the artifact for `spec` from `source`.
    ///
    /// An existing cache entry is returned without touching the network or
    /// the source. On a miss, remote sources are fetched from
    /// `<source>/gems/<file>`; `file://` and bare-path sources are copied.
    /// A permission error while copying returns the source location itself.
    pub fn download(
        &self,
        spec: &PackageDescriptor,
        source: &str,
        install_dir: &Path,
    ) -> Result<PathBuf> {
        spec.validate()?;
        let source_uri = SourceUri::parse(source)?;

        let cwd = std::env::current_dir().ok();
        let cache_dir = select_cache_dir(install_dir, cwd.as_deref(), &self.user_cache_dir);
        ensure_dir(&cache_dir);

        if let Some(hit) = cached_entry(spec, source_uri.scheme(), &cache_dir) {
            tracing::debug!(path = %hit.display(), "cache hit");
            return Ok(hit);
        }

        match source_uri.scheme() {
            Scheme::Http | Scheme::Https | Scheme::ObjectStore => {
                self.download_remote(spec, &source_uri, &cache_dir)
            }
            Scheme::File => copy_from_file_source(spec, &source_uri, &cache_dir),
            Scheme::Local => copy_from_local_path(spec, &source_uri, &cache_dir),
        }
    }

    fn download_remote(
        &self,
        spec: &PackageDescriptor,
        source: &SourceUri,
        cache_dir: &Path,
    ) -> Result<PathBuf> {
        let file_name = spec.cache_file_name();
        tracing::info!("Downloading gem {}", file_name);
        let local_path = cache_dir.join(&file_name);

        match self.fetch_into(source, &file_name, &local_path) {
            Ok(()) => Ok(local_path),
            Err(e) if spec.has_alternate() && !matches!(e, FetchError::Io { .. }) => {
                let alternate = spec.alternate_file_name();
                tracing::info!(error = %e, "Failed, downloading gem {}", alternate);
                let alternate_path = cache_dir.join(&alternate);
                self.fetch_into(source, &alternate, &alternate_path)?;
                Ok(alternate_path)
            }
            Err(e) => Err(e),
        }
    }

    fn fetch_into(&self, source: &SourceUri, file_name: &str, local_path: &Path) -> Result<()> {
        let remote = source.join_under(&format!("gems/{}", file_name))?;
        self.fetcher
            .cache_update_path(&remote, Some(local_path), true)?;
        Ok(())
    }
}

/// Existing entry for `spec`, if any. The alternate name only counts for
/// remote sources, the only place it is ever written.
fn cached_entry(spec: &PackageDescriptor, scheme: Scheme, cache_dir: &Path) -> Option<PathBuf> {
    let primary = cache_dir.join(spec.cache_file_name());
    if primary.exists() {
        return Some(primary);
    }
    if scheme.is_remote() && spec.has_alternate() {
        let alternate = cache_dir.join(spec.alternate_file_name());
        if alternate.exists() {
            return Some(alternate);
        }
    }
    None
}

/// `file://` source: a repository root (or a `.gem` inside one) holding
/// `gems/<file>`.
fn copy_from_file_source(
    spec: &PackageDescriptor,
    source: &SourceUri,
    cache_dir: &Path,
) -> Result<PathBuf> {
    let mut root = source.to_local_path();
    if root.extension().is_some_and(|ext| ext == ARTIFACT_EXT) {
        root = root.parent().map(Path::to_path_buf).unwrap_or_default();
    }
    let file_name = spec.cache_file_name();
    let remote_path = root.join("gems").join(&file_name);
    let local_path = cache_dir.join(&file_name);

    copy_or_use_source(&remote_path, local_path, source)
}

/// Bare-path source: the artifact file itself.
fn copy_from_local_path(
    spec: &PackageDescriptor,
    source: &SourceUri,
    cache_dir: &Path,
) -> Result<PathBuf> {
    let source_path = source.to_local_path();
    let local_path = cache_dir.join(spec.cache_file_name());

    if same_file(&source_path, &local_path) {
        tracing::info!("Using local gem {}", local_path.display());
        return Ok(local_path);
    }
    copy_or_use_source(&source_path, local_path, source)
}

fn copy_or_use_source(from: &Path, local_path: PathBuf, source: &SourceUri) -> Result<PathBuf> {
    match storage::copy_atomic(from, &local_path) {
        Ok(_) => {
            tracing::info!("Using local gem {}", local_path.display());
            Ok(local_path)
        }
        Err(e) if e.is_permission_denied() => {
            tracing::info!(error = %e, "Using local gem {} in place", source);
            Ok(PathBuf::from(source.as_str()))
        }
        Err(e) => Err(e),
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
