//! `gemfetch fetch <uri>`: print or save the bytes behind a URI.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::config::FetchConfig;
use crate::{storage, Fetcher, HeaderSet};

pub fn run_fetch(
    cfg: &FetchConfig,
    headers: HeaderSet,
    uri: &str,
    output: Option<&Path>,
) -> Result<()> {
    let fetcher = Fetcher::with_config(headers, cfg);
    let response = fetcher.fetch_location(uri, None, false)?;
    match output {
        Some(path) => {
            storage::write_atomic(path, &response.body)?;
            eprintln!("{} bytes -> {}", response.body.len(), path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&response.body)?;
            out.flush()?;
        }
    }
    Ok(())
}
