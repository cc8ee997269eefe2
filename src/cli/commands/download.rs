//! `gemfetch download <name> <version> <platform> --source <src>`.

use anyhow::Result;
use std::path::Path;

use crate::config::FetchConfig;
use crate::{CacheResolver, HeaderSet, PackageDescriptor};

pub fn run_download(
    cfg: &FetchConfig,
    headers: HeaderSet,
    spec: &PackageDescriptor,
    source: &str,
    install_dir: &Path,
) -> Result<()> {
    let resolver = CacheResolver::from_config(headers, cfg)?;
    let path = resolver.download(spec, source, install_dir)?;
    println!("{}", path.display());
    Ok(())
}
