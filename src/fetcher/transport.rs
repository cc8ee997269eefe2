//! Single-request HTTP transport.
//!
//! One call performs exactly one request and never follows redirects; the
//! fetcher owns the redirect loop so it can enforce the hop bound and the
//! HTTPS downgrade check itself.

use super::classify::classify_curl_error;
use super::parse::{parse_headers, ResponseHead};
use crate::config::FetchConfig;
use crate::error::Result;
use crate::headers::HeaderSet;
use curl::easy::{Easy, List, TimeCondition};
use std::str;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One outgoing request.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    /// HEAD instead of GET.
    pub head_only: bool,
    /// Sent as an `If-Modified-Since` condition when present.
    pub last_modified: Option<SystemTime>,
    pub headers: &'a HeaderSet,
}

/// Status, parsed head and raw body of one response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u32,
    pub head: ResponseHead,
    pub body: Vec<u8>,
}

/// Performs single HTTP requests. Errors must already be classified
/// `FetchError`s (see `classify`).
pub trait Transport {
    fn perform(&self, request: &HttpRequest<'_>) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        (**self).perform(request)
    }
}

/// libcurl-backed transport. Runs in the current thread.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl CurlTransport {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Transport for CurlTransport {
    fn perform(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        let url = request.url;
        let curl_err = |e: curl::Error| classify_curl_error(&e, url);

        let mut lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = Easy::new();
        easy.url(url).map_err(curl_err)?;
        if request.head_only {
            easy.nobody(true).map_err(curl_err)?;
        } else {
            easy.get(true).map_err(curl_err)?;
        }
        easy.follow_location(false).map_err(curl_err)?;
        easy.connect_timeout(self.connect_timeout).map_err(curl_err)?;
        easy.timeout(self.timeout).map_err(curl_err)?;

        if let Some(ua) = &self.user_agent {
            if !request.headers.contains("User-Agent") {
                easy.useragent(ua).map_err(curl_err)?;
            }
        }

        if let Some(mtime) = request.last_modified {
            let secs = mtime
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            easy.time_condition(TimeCondition::IfModifiedSince)
                .map_err(curl_err)?;
            easy.time_value(secs).map_err(curl_err)?;
        }

        // Build curl list for custom headers (e.g. "Name: value").
        if !request.headers.is_empty() {
            let mut list = List::new();
            for line in request.headers.to_lines() {
                list.append(&line).map_err(curl_err)?;
            }
            easy.http_headers(list).map_err(curl_err)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(curl_err)?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let status = easy.response_code().map_err(curl_err)?;

        Ok(HttpResponse {
            status,
            head: parse_headers(&lines),
            body,
        })
    }
}
