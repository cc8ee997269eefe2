//! Error taxonomy for fetching and cache resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the fetcher and the cache resolver.
///
/// Transport-level failures are classified once, at the transport boundary
/// (see `fetcher::classify`); everything above that passes these values
/// through untouched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Malformed or schemeless URI handed to the fetch entry point.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Redirect chain exceeded the hop bound.
    #[error("too many redirects fetching {uri}")]
    TooManyRedirects { uri: String },

    /// An HTTPS source redirected to a non-HTTPS location.
    #[error("redirect from {from} to insecure location {to}")]
    InsecureRedirect { from: String, to: String },

    /// Unexpected HTTP status.
    #[error("bad response {status_message} {status_code} ({uri})")]
    BadResponse {
        status_message: String,
        status_code: u32,
        uri: String,
    },

    /// Name resolution failed or the request timed out.
    #[error("unknown host: {reason} ({uri})")]
    UnknownHost { reason: String, uri: String },

    /// Payload was expected to be gzip but did not decompress.
    #[error("corrupt server response from {uri}: {message}")]
    CorruptServerResponse { uri: String, message: String },

    /// Scheme outside the supported set.
    #[error("unsupported URI scheme {0:?}")]
    UnsupportedScheme(String),

    /// Any other low-level socket/IO/TLS failure, class and message preserved.
    #[error("{class}: {message} ({uri})")]
    Transport {
        class: String,
        message: String,
        uri: String,
    },

    /// Filesystem failure while reading a source or populating the cache.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the filesystem refusing access.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            FetchError::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
