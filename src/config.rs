use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Origin of the proxied search service, without a trailing slash.
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Directory of JSON files mapping content hashes to descriptions.
    #[serde(default = "default_catalog_dir")]
    pub dir: PathBuf,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_origin() -> String {
    "https://discmaster.textfiles.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("./catalog")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: default_catalog_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Normalize so link building can always do origin + relative href
    config.upstream.origin = config.upstream.origin.trim_end_matches('/').to_string();

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if !config.upstream.origin.starts_with("http://") && !config.upstream.origin.starts_with("https://")
    {
        anyhow::bail!(
            "upstream.origin must be an http(s) origin, got '{}'",
            config.upstream.origin
        );
    }

    if config.upstream.timeout_secs == 0 {
        anyhow::bail!("upstream.timeout_secs must be > 0");
    }

    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to the built-in
/// defaults. A present-but-malformed file is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}
