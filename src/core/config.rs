use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::asset::{AssetRegistry, CatalogEntry, Category};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Directory of browser assets served for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for YahooProviderConfig {
    fn default() -> Self {
        YahooProviderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub yahoo: YahooProviderConfig,
}

/// Instrument lists per category, replacing the built-in catalog.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub stocks: Vec<CatalogEntry>,
    #[serde(default)]
    pub metals: Vec<CatalogEntry>,
    #[serde(default)]
    pub crypto: Vec<CatalogEntry>,
    #[serde(default)]
    pub forex: Vec<CatalogEntry>,
}

impl CatalogConfig {
    pub fn to_registry(&self) -> Result<AssetRegistry> {
        let catalog = BTreeMap::from([
            (Category::Stocks, self.stocks.clone()),
            (Category::Metals, self.metals.clone()),
            (Category::Crypto, self.crypto.clone()),
            (Category::Forex, self.forex.clone()),
        ]);
        AssetRegistry::from_catalog(&catalog)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "marketboard", "marketboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Rejects settings that deserialize but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.providers.yahoo.timeout_secs == 0 {
            bail!("providers.yahoo.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Registry from the configured catalog, or the built-in one.
    pub fn registry(&self) -> Result<AssetRegistry> {
        match &self.catalog {
            Some(catalog) => catalog.to_registry().context("Invalid catalog in config"),
            None => Ok(AssetRegistry::default()),
        }
    }
}
