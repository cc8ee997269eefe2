use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from `~/.config/gemfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds allowed for the TCP/TLS connect phase of each request.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request (one redirect hop).
    pub timeout_secs: u64,
    /// User-Agent sent with every request unless the header set overrides it.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Path-style endpoint for `s3://` sources (e.g. a MinIO URL). When unset,
    /// buckets are addressed as `https://<bucket>.s3.amazonaws.com`.
    #[serde(default)]
    pub object_store_endpoint: Option<String>,
    /// Overrides the user-level cache directory used when the install dir is
    /// not writable.
    #[serde(default)]
    pub user_cache_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 300,
            user_agent: None,
            object_store_endpoint: None,
            user_cache_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// User-level cache directory: the configured override, else
    /// `$XDG_CACHE_HOME/gemfetch`.
    pub fn user_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.user_cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("gemfetch")?;
        Ok(xdg_dirs.get_cache_home().join("gemfetch"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gemfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
