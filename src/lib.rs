//! gemfetch: fetch package artifacts over HTTP(S), `s3://` or the local
//! filesystem and keep them in a local gem cache.
//!
//! - [`fetcher`]: scheme dispatch, redirect following, gunzip.
//! - [`cache`]: cache directory selection, hit detection, alternate names.

pub mod cli;
pub mod config;
pub mod logging;

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod headers;
pub mod source_uri;
pub mod storage;

pub use cache::{CacheResolver, PackageDescriptor};
pub use error::{FetchError, Result};
pub use fetcher::{FetchResponse, Fetcher};
pub use headers::HeaderSet;
pub use source_uri::{Scheme, SourceUri};
