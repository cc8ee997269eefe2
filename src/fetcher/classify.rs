//! Classify curl and IO errors into the fetch error taxonomy.
//!
//! This is the only place low-level errors become `FetchError`s; everything
//! above the transport passes classified errors through as-is.

use crate::error::FetchError;
use std::io;

const TIMED_OUT: &str = "timed out";
const NO_SUCH_NAME: &str = "no such name";

/// Message fragments resolvers and OSes use for failed name lookups.
const RESOLUTION_HINTS: &[&str] = &[
    "getaddrinfo",
    "name or service not known",
    "nodename nor servname",
    "no such host",
    "could not resolve host",
    "failed to lookup address",
    "temporary failure in name resolution",
];

/// Classify a curl error for the request to `uri`.
pub fn classify_curl_error(e: &curl::Error, uri: &str) -> FetchError {
    if e.is_operation_timedout() {
        return unknown_host(TIMED_OUT, uri);
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return unknown_host(NO_SUCH_NAME, uri);
    }
    let message = match e.extra_description() {
        Some(extra) => format!("{} ({})", e.description(), extra),
        None => e.description().to_string(),
    };
    if mentions_resolution(&message) {
        return unknown_host(NO_SUCH_NAME, uri);
    }
    FetchError::Transport {
        class: format!("curl::Error({})", e.code()),
        message,
        uri: uri.to_string(),
    }
}

/// Classify an IO error raised while reading from `uri`.
pub fn classify_io_error(e: &io::Error, uri: &str) -> FetchError {
    if e.kind() == io::ErrorKind::TimedOut {
        return unknown_host(TIMED_OUT, uri);
    }
    let message = e.to_string();
    if mentions_resolution(&message) {
        return unknown_host(NO_SUCH_NAME, uri);
    }
    FetchError::Transport {
        class: format!("io::Error({:?})", e.kind()),
        message,
        uri: uri.to_string(),
    }
}

fn mentions_resolution(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    RESOLUTION_HINTS.iter().any(|hint| lower.contains(hint))
}

fn unknown_host(reason: &str, uri: &str) -> FetchError {
    FetchError::UnknownHost {
        reason: reason.to_string(),
        uri: uri.to_string(),
    }
}
