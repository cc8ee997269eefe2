//! Fetcher: resolve a source URI to bytes.
//!
//! Dispatches on scheme, follows redirects with a hard hop bound and no
//! HTTPS → HTTP downgrade, and gunzips `*.gz` payloads. Blocking; each call
//! runs to completion on the current thread.

pub mod classify;
mod decompress;
mod parse;
mod transport;

pub use decompress::gunzip;
pub use parse::ResponseHead;
pub use transport::{CurlTransport, HttpRequest, HttpResponse, Transport};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::headers::HeaderSet;
use crate::source_uri::{Scheme, SourceUri};
use crate::storage;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use url::Url;

/// Maximum redirect hops per fetch. A redirect received after this many hops
/// fails with `TooManyRedirects`, so at most `MAX_REDIRECTS + 1` requests are
/// issued.
pub const MAX_REDIRECTS: u32 = 10;

/// A single logical fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub uri: SourceUri,
    pub last_modified: Option<SystemTime>,
    pub head_only: bool,
    /// Hops taken so far; starts at 0.
    pub redirect_depth: u32,
}

impl FetchRequest {
    pub fn new(uri: SourceUri, last_modified: Option<SystemTime>, head_only: bool) -> Self {
        Self {
            uri,
            last_modified,
            head_only,
            redirect_depth: 0,
        }
    }
}

/// Result of a fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// 200 or 304 for HTTP; 200 for local files.
    pub status: u32,
    pub head: ResponseHead,
    /// Empty for head-only fetches and 304s; gunzipped for `*.gz` paths.
    pub body: Vec<u8>,
    /// URI the terminal response came from, after redirects.
    pub final_uri: SourceUri,
}

impl FetchResponse {
    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }
}

/// Fetches bytes for source URIs.
///
/// Headers are fixed at construction and sent with every request, including
/// each redirect hop.
#[derive(Debug)]
pub struct Fetcher<T: Transport = CurlTransport> {
    transport: T,
    headers: HeaderSet,
    object_store_endpoint: Option<String>,
}

impl Fetcher<CurlTransport> {
    /// Curl-backed fetcher with default timeouts.
    pub fn new(headers: HeaderSet) -> Self {
        Self::with_config(headers, &FetchConfig::default())
    }

    pub fn with_config(headers: HeaderSet, cfg: &FetchConfig) -> Self {
        Self {
            transport: CurlTransport::new(cfg),
            headers,
            object_store_endpoint: cfg.object_store_endpoint.clone(),
        }
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T, headers: HeaderSet) -> Self {
        Self {
            transport,
            headers,
            object_store_endpoint: None,
        }
    }

    /// Path-style endpoint for `s3://` sources.
    pub fn object_store_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.object_store_endpoint = Some(endpoint.into());
        self
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Top-level fetch entry point.
    ///
    /// Schemeless URIs are rejected with `InvalidArgument`. A non-empty,
    /// non-HEAD result whose path ends in `.gz` is decompressed; bad gzip is
    /// `CorruptServerResponse`.
    pub fn fetch_path(
        &self,
        uri: &SourceUri,
        last_modified: Option<SystemTime>,
        head_only: bool,
    ) -> Result<FetchResponse> {
        let mut response = match uri.scheme() {
            Scheme::Local => {
                return Err(FetchError::InvalidArgument(format!(
                    "uri scheme is invalid: {:?} has no scheme",
                    uri.as_str()
                )))
            }
            Scheme::Http | Scheme::Https => {
                self.fetch_http(FetchRequest::new(uri.clone(), last_modified, head_only))?
            }
            Scheme::ObjectStore => {
                let http = self.object_store_uri(uri)?;
                self.fetch_http(FetchRequest::new(http, last_modified, head_only))?
            }
            Scheme::File => fetch_file(uri, head_only)?,
        };

        if !head_only && !response.body.is_empty() && uri.is_gzip() {
            response.body = gunzip(&response.body, uri.as_str())?;
        }
        Ok(response)
    }

    /// Parses `location` and fetches it. See [`fetch_path`](Self::fetch_path).
    pub fn fetch_location(
        &self,
        location: &str,
        last_modified: Option<SystemTime>,
        head_only: bool,
    ) -> Result<FetchResponse> {
        let uri = SourceUri::parse(location)?;
        self.fetch_path(&uri, last_modified, head_only)
    }

    /// HEAD-only fetch returning `Content-Length`, when the server sends one.
    pub fn fetch_size(&self, uri: &SourceUri) -> Result<Option<u64>> {
        Ok(self.fetch_path(uri, None, true)?.head.content_length)
    }

    /// Fetches `uri` conditionally on the mtime of `path`.
    ///
    /// A 304 with an existing `path` returns the file's current bytes; a 304
    /// with nothing on disk is a `BadResponse` and writes nothing. Otherwise the fetched bytes are returned and, when `update` is set,
    /// atomically written to `path`.
    pub fn cache_update_path(
        &self,
        uri: &SourceUri,
        path: Option<&Path>,
        update: bool,
    ) -> Result<Vec<u8>> {
        let mtime = path
            .and_then(|p| fs::metadata(p).ok())
            .and_then(|m| m.modified().ok());

        let response = self.fetch_path(uri, mtime, false)?;

        if let Some(p) = path {
            if response.is_not_modified() {
                if p.exists() {
                    tracing::debug!(uri = %uri, path = %p.display(), "not modified, using cached copy");
                    return fs::read(p).map_err(|e| FetchError::io(p, e));
                }
                // Nothing to reuse; an empty body must not become a cache entry.
                return Err(FetchError::BadResponse {
                    status_message: response
                        .head
                        .status_message
                        .unwrap_or_else(|| "Not Modified".to_string()),
                    status_code: 304,
                    uri: response.final_uri.to_string(),
                });
            }
            if update {
                storage::write_atomic(p, &response.body)?;
            }
        }
        Ok(response.body)
    }

    /// Issues the request and follows redirects as a loop over `(uri, depth)`.
    fn fetch_http(&self, request: FetchRequest) -> Result<FetchResponse> {
        let FetchRequest {
            mut uri,
            last_modified,
            head_only,
            redirect_depth: mut depth,
        } = request;
        let origin_secure = uri.scheme() == Scheme::Https;
        let method = if head_only { "HEAD" } else { "GET" };

        loop {
            tracing::debug!(uri = %uri, depth, "{} request", method);
            let response = self.transport.perform(&HttpRequest {
                url: uri.as_str(),
                head_only,
                last_modified,
                headers: &self.headers,
            })?;

            match response.status {
                200 | 304 => {
                    return Ok(FetchResponse {
                        status: response.status,
                        head: response.head,
                        body: response.body,
                        final_uri: uri,
                    })
                }
                301 | 302 | 303 | 307 => {
                    if depth >= MAX_REDIRECTS {
                        return Err(FetchError::TooManyRedirects {
                            uri: uri.to_string(),
                        });
                    }
                    let location = redirect_target(&uri, response.status, &response.head)?;
                    let secure = origin_secure || uri.scheme() == Scheme::Https;
                    if secure && location.scheme() != "https" {
                        return Err(FetchError::InsecureRedirect {
                            from: uri.to_string(),
                            to: location.to_string(),
                        });
                    }
                    let target = SourceUri::from_url(location)?;
                    if !matches!(target.scheme(), Scheme::Http | Scheme::Https) {
                        return Err(FetchError::UnsupportedScheme(
                            target.scheme().as_str().to_string(),
                        ));
                    }
                    tracing::debug!(from = %uri, to = %target, depth = depth + 1, "following redirect");
                    uri = target;
                    depth += 1;
                }
                code => {
                    return Err(FetchError::BadResponse {
                        status_message: response
                            .head
                            .status_message
                            .unwrap_or_else(|| format!("HTTP {}", code)),
                        status_code: code,
                        uri: uri.to_string(),
                    })
                }
            }
        }
    }

    /// `s3://bucket/key` → `https://bucket.s3.amazonaws.com/key`, or
    /// `<endpoint>/bucket/key` when an endpoint is configured.
    fn object_store_uri(&self, uri: &SourceUri) -> Result<SourceUri> {
        let bucket = uri.host();
        if bucket.is_empty() {
            return Err(FetchError::InvalidArgument(format!(
                "object store URI without bucket: {}",
                uri
            )));
        }
        let mut target = match &self.object_store_endpoint {
            Some(endpoint) => format!("{}/{}{}", endpoint.trim_end_matches('/'), bucket, uri.path()),
            None => format!("https://{}.s3.amazonaws.com{}", bucket, uri.path()),
        };
        if let Some(query) = uri.url().and_then(|u| u.query()) {
            target.push('?');
            target.push_str(query);
        }
        let http = SourceUri::parse(&target)?;
        match http.scheme() {
            Scheme::Http | Scheme::Https => Ok(http),
            other => Err(FetchError::UnsupportedScheme(other.as_str().to_string())),
        }
    }
}

/// Resolves `Location` against `uri`. The scheme is left unchecked so the
/// downgrade rule sees the raw target.
fn redirect_target(uri: &SourceUri, status: u32, head: &ResponseHead) -> Result<Url> {
    let location = head
        .location
        .as_deref()
        .ok_or_else(|| FetchError::BadResponse {
            status_message: "redirect without Location".to_string(),
            status_code: status,
            uri: uri.to_string(),
        })?;
    let base = uri.url().ok_or_else(|| {
        FetchError::InvalidArgument(format!("cannot resolve {location} against {uri}"))
    })?;
    base.join(location)
        .map_err(|e| FetchError::InvalidArgument(format!("{location}: {e}")))
}

fn fetch_file(uri: &SourceUri, head_only: bool) -> Result<FetchResponse> {
    let path = uri.to_local_path();
    let io_err = |e: std::io::Error| classify::classify_io_error(&e, uri.as_str());

    let meta = fs::metadata(&path).map_err(io_err)?;
    let head = ResponseHead {
        content_length: Some(meta.len()),
        ..ResponseHead::default()
    };
    let body = if head_only {
        Vec::new()
    } else {
        fs::read(&path).map_err(io_err)?
    };
    Ok(FetchResponse {
        status: 200,
        head,
        body,
        final_uri: uri.clone(),
    })
}
