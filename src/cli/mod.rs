//! CLI for gemfetch.

mod commands;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::headers::HeaderSet;
use commands::{run_download, run_fetch, run_size};

/// Top-level CLI for gemfetch.
#[derive(Debug, Parser)]
#[command(name = "gemfetch")]
#[command(about = "gemfetch: fetch gems and index files into a local cache", long_about = None)]
pub struct Cli {
    /// Extra request header, `Name: value`. May be repeated; goes before the subcommand.
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URI and write its (gunzipped) bytes to stdout or a file.
    Fetch {
        /// http(s)://, s3:// or file:// URI.
        uri: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the remote size of a URI (HEAD request).
    Size {
        /// http(s)://, s3:// or file:// URI.
        uri: String,
    },

    /// Resolve a gem into the local cache and print its path.
    Download {
        name: String,
        version: String,
        platform: String,
        /// Gem source: remote base URI, file:// repository or local path.
        #[arg(long)]
        source: String,
        /// Platform the gem was requested for, if it differs from `platform`.
        #[arg(long)]
        original_platform: Option<String>,
        /// Installation root; the cache is `<install-dir>/cache`.
        #[arg(long, default_value = ".")]
        install_dir: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let headers = parse_headers(&cli.headers)?;

        match cli.command {
            CliCommand::Fetch { uri, output } => {
                run_fetch(&cfg, headers, &uri, output.as_deref())?
            }
            CliCommand::Size { uri } => run_size(&cfg, headers, &uri)?,
            CliCommand::Download {
                name,
                version,
                platform,
                source,
                original_platform,
                install_dir,
            } => {
                let mut spec = crate::PackageDescriptor::new(name, version, platform);
                if let Some(p) = original_platform {
                    spec = spec.with_original_platform(p);
                }
                run_download(&cfg, headers, &spec, &source, &install_dir)?;
            }
        }

        Ok(())
    }
}

/// Parses repeated `Name: value` arguments into a header set.
pub fn parse_headers(raw: &[String]) -> Result<HeaderSet> {
    let mut headers = HeaderSet::new();
    for h in raw {
        let Some((name, value)) = h.split_once(':') else {
            bail!("invalid header {:?}: expected `Name: value`", h);
        };
        if name.trim().is_empty() {
            bail!("invalid header {:?}: empty name", h);
        }
        headers.insert(name, value);
    }
    Ok(headers)
}
