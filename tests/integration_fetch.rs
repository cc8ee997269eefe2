//! Integration test: curl-backed fetcher and cache resolver against a local
//! HTTP server.

mod common;

use common::gem_server::{self, Route};
use flate2::write::GzEncoder;
use flate2::Compression;
use gemfetch::{CacheResolver, FetchError, Fetcher, HeaderSet, PackageDescriptor, SourceUri};
use std::io::Write;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

#[test]
fn download_fetches_gem_into_cache_once() {
    let server = gem_server::start(vec![("/gems/foo-1.0-ruby.gem", Route::ok(b"GEMDATA"))]);
    let install = tempdir().unwrap();
    let user = tempdir().unwrap();
    let resolver = CacheResolver::new(Fetcher::new(HeaderSet::new()), user.path());
    let spec = PackageDescriptor::new("foo", "1.0", "ruby");

    let path = resolver
        .download(&spec, &server.base, install.path())
        .expect("download");
    assert_eq!(path, install.path().join("cache").join("foo-1.0-ruby.gem"));
    assert_eq!(std::fs::read(&path).unwrap(), b"GEMDATA");
    assert_eq!(server.paths(), vec!["/gems/foo-1.0-ruby.gem"]);

    let again = resolver
        .download(&spec, &server.base, install.path())
        .expect("cached download");
    assert_eq!(again, path);
    assert_eq!(server.paths().len(), 1, "cache hit must not hit the network");
}

#[test]
fn download_falls_back_to_alternate_name() {
    let server = gem_server::start(vec![("/gems/foo-1.0.gem", Route::ok(b"ALT"))]);
    let install = tempdir().unwrap();
    let user = tempdir().unwrap();
    let resolver = CacheResolver::new(Fetcher::new(HeaderSet::new()), user.path());
    let spec = PackageDescriptor::new("foo", "1.0", "ruby").with_original_platform("java");

    let path = resolver
        .download(&spec, &server.base, install.path())
        .expect("alternate download");
    assert_eq!(
        server.paths(),
        vec!["/gems/foo-1.0-ruby.gem", "/gems/foo-1.0.gem"]
    );
    assert_eq!(path, install.path().join("cache").join("foo-1.0.gem"));
    assert_eq!(std::fs::read(&path).unwrap(), b"ALT");
}

#[test]
fn download_without_platform_variant_does_not_retry() {
    let server = gem_server::start(vec![("/gems/foo-1.0.gem", Route::ok(b"ALT"))]);
    let install = tempdir().unwrap();
    let user = tempdir().unwrap();
    let resolver = CacheResolver::new(Fetcher::new(HeaderSet::new()), user.path());

    let err = resolver
        .download(
            &PackageDescriptor::new("foo", "1.0", "ruby"),
            &server.base,
            install.path(),
        )
        .unwrap_err();
    match err {
        FetchError::BadResponse {
            status_message,
            status_code,
            ..
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(status_message, "Not Found");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(server.paths(), vec!["/gems/foo-1.0-ruby.gem"]);
}

fn redirect_chain(hops: usize) -> Vec<(String, Route)> {
    let mut routes: Vec<(String, Route)> = (0..hops)
        .map(|i| (format!("/hop{}", i), Route::redirect(&format!("/hop{}", i + 1))))
        .collect();
    routes.push((format!("/hop{}", hops), Route::ok(b"end of chain")));
    routes
}

#[test]
fn follows_ten_redirects() {
    let routes = redirect_chain(10);
    let server = gem_server::start(routes.iter().map(|(p, r)| (p.as_str(), r.clone())).collect());
    let fetcher = Fetcher::new(HeaderSet::new());

    let r = fetcher
        .fetch_location(&server.url("/hop0"), None, false)
        .expect("10 hops are allowed");
    assert_eq!(r.body, b"end of chain");
    assert_eq!(server.paths().len(), 11);
}

#[test]
fn eleventh_redirect_is_refused() {
    let routes = redirect_chain(11);
    let server = gem_server::start(routes.iter().map(|(p, r)| (p.as_str(), r.clone())).collect());
    let fetcher = Fetcher::new(HeaderSet::new());

    let err = fetcher
        .fetch_location(&server.url("/hop0"), None, false)
        .unwrap_err();
    assert!(matches!(err, FetchError::TooManyRedirects { .. }));
    let paths = server.paths();
    assert_eq!(paths.len(), 11);
    assert!(!paths.contains(&"/hop11".to_string()));
}

#[test]
fn headers_reach_every_hop() {
    let server = gem_server::start(vec![
        ("/start", Route::redirect("/final")),
        ("/final", Route::ok(b"ok")),
    ]);
    let headers = HeaderSet::new()
        .with("Authorization", "Basic Zm9vOmJhcg==")
        .with("X-Gem-Client", "gemfetch-tests");
    let fetcher = Fetcher::new(headers);

    fetcher
        .fetch_location(&server.url("/start"), None, false)
        .unwrap();
    let seen = server.seen();
    assert_eq!(seen.len(), 2);
    for req in &seen {
        assert_eq!(req.header("Authorization"), Some("Basic Zm9vOmJhcg=="));
        assert_eq!(req.header("X-Gem-Client"), Some("gemfetch-tests"));
    }
}

#[test]
fn gz_payload_is_inflated_and_garbage_rejected() {
    let server = gem_server::start(vec![
        ("/specs.4.8.gz", Route::ok(&gzip(b"marshalled specs"))),
        ("/latest_specs.4.8.gz", Route::ok(b"<html>oops</html>")),
    ]);
    let fetcher = Fetcher::new(HeaderSet::new());

    let r = fetcher
        .fetch_location(&server.url("/specs.4.8.gz"), None, false)
        .unwrap();
    assert_eq!(r.body, b"marshalled specs");

    let err = fetcher
        .fetch_location(&server.url("/latest_specs.4.8.gz"), None, false)
        .unwrap_err();
    assert!(matches!(err, FetchError::CorruptServerResponse { .. }));
}

#[test]
fn head_request_and_conditional_get() {
    let server = gem_server::start(vec![
        ("/gems/foo-1.0-ruby.gem", Route::ok(&[1u8; 2048])),
        ("/specs.4.8", Route::status("304 Not Modified")),
    ]);
    let fetcher = Fetcher::new(HeaderSet::new());

    let size = fetcher
        .fetch_size(&SourceUri::parse(&server.url("/gems/foo-1.0-ruby.gem")).unwrap())
        .unwrap();
    assert_eq!(size, Some(2048));

    let since = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let r = fetcher
        .fetch_location(&server.url("/specs.4.8"), Some(since), false)
        .unwrap();
    assert!(r.is_not_modified());
    assert!(r.body.is_empty());

    let seen = server.seen();
    assert_eq!(seen[0].method, "HEAD");
    assert_eq!(seen[1].method, "GET");
    assert!(seen[1].header("If-Modified-Since").is_some());
}
