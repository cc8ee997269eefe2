//! Source location modeling.
//!
//! Parses caller-supplied source strings into a closed set of schemes so that
//! every dispatch site is an exhaustive `match`. Anything outside the set is
//! rejected here, before any network or filesystem activity.

mod unescape;

pub use unescape::unescape;

use crate::error::{FetchError, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Supported source schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    /// `s3://bucket/key`, fetched over HTTP(S) like the other remotes.
    ObjectStore,
    File,
    /// No scheme: a bare filesystem path.
    Local,
}

impl Scheme {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "s3" => Some(Scheme::ObjectStore),
            "file" => Some(Scheme::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::ObjectStore => "s3",
            Scheme::File => "file",
            Scheme::Local => "",
        }
    }

    /// Remote schemes go through the fetcher; the rest are filesystem copies.
    pub fn is_remote(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https | Scheme::ObjectStore)
    }
}

/// A parsed source reference. Immutable; build a new one per hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUri {
    scheme: Scheme,
    host: String,
    path: String,
    raw: String,
    url: Option<Url>,
}

impl SourceUri {
    /// Parses a source location.
    ///
    /// - `http://`, `https://`, `s3://`, `file://` map to their schemes.
    /// - Bare paths (`/srv/gems`, `gems/foo.gem`) are `Local`.
    /// - A one-letter scheme is a drive letter (`C:/gems/foo.gem`) and is `Local`.
    /// - Any other scheme fails with `UnsupportedScheme`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(FetchError::InvalidArgument(
                "empty source location".to_string(),
            ));
        }
        match Url::parse(input) {
            Ok(url) => {
                if is_drive_letter(url.scheme()) {
                    return Ok(Self::local(input));
                }
                Self::from_url(url)
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self::local(input)),
            Err(e) => Err(FetchError::InvalidArgument(format!("{input}: {e}"))),
        }
    }

    pub(crate) fn from_url(url: Url) -> Result<Self> {
        let scheme = Scheme::from_name(url.scheme())
            .ok_or_else(|| FetchError::UnsupportedScheme(url.scheme().to_string()))?;
        Ok(Self {
            scheme,
            host: url.host_str().unwrap_or("").to_string(),
            path: url.path().to_string(),
            raw: url.to_string(),
            url: Some(url),
        })
    }

    fn local(input: &str) -> Self {
        Self {
            scheme: Scheme::Local,
            host: String::new(),
            path: input.to_string(),
            raw: input.to_string(),
            url: None,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path component, still percent-encoded for URL schemes.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// True when the path names a gzip payload.
    pub fn is_gzip(&self) -> bool {
        self.path.ends_with(".gz")
    }

    /// Resolves `reference` against this URI (RFC 3986), e.g. a relative
    /// `Location` header or `gems/<file>` under a source root. Absolute
    /// references replace this URI entirely.
    pub fn join(&self, reference: &str) -> Result<SourceUri> {
        let base = self.url.as_ref().ok_or_else(|| {
            FetchError::InvalidArgument(format!("cannot resolve {reference} against {}", self.raw))
        })?;
        let joined = base
            .join(reference)
            .map_err(|e| FetchError::InvalidArgument(format!("{reference}: {e}")))?;
        Self::from_url(joined)
    }

    /// Resolves `relative` beneath this URI treated as a directory, so
    /// `http://h/mirror` + `gems/a.gem` keeps the `mirror` segment.
    pub fn join_under(&self, relative: &str) -> Result<SourceUri> {
        let mut base = self.url.clone().ok_or_else(|| {
            FetchError::InvalidArgument(format!("cannot resolve {relative} against {}", self.raw))
        })?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let joined = base
            .join(relative.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidArgument(format!("{relative}: {e}")))?;
        Self::from_url(joined)
    }

    /// Filesystem path for `file://` and bare sources, percent-unescaped.
    pub fn to_local_path(&self) -> PathBuf {
        match self.scheme {
            Scheme::File => self
                .url
                .as_ref()
                .and_then(|u| u.to_file_path().ok())
                .unwrap_or_else(|| PathBuf::from(unescape(&self.path))),
            _ => PathBuf::from(unescape(&self.path)),
        }
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_drive_letter(scheme: &str) -> bool {
    scheme.len() == 1 && scheme.as_bytes()[0].is_ascii_alphabetic()
}
