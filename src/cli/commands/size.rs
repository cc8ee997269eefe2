//! `gemfetch size <uri>`: remote size from a HEAD request.

use anyhow::Result;

use crate::config::FetchConfig;
use crate::{Fetcher, HeaderSet, SourceUri};

pub fn run_size(cfg: &FetchConfig, headers: HeaderSet, uri: &str) -> Result<()> {
    let fetcher = Fetcher::with_config(headers, cfg);
    match fetcher.fetch_size(&SourceUri::parse(uri)?)? {
        Some(n) => println!("{n}"),
        None => println!("unknown"),
    }
    Ok(())
}
