use crate::core::returns::Asset;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_UPSTREAM_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    /// Base URL of the relay the CLI fetches from.
    pub relay: Option<RelayProviderConfig>,
    /// Upstream finance API the relay forwards to.
    pub yahoo: Option<YahooProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_assets")]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub server: Option<ServerConfig>,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            assets: default_assets(),
            providers: ProvidersConfig::default(),
            server: None,
            data_path: None,
        }
    }
}

/// The asset list the chart shipped with.
fn default_assets() -> Vec<Asset> {
    let assets = [
        ("GLD", "Gold", "#FFD700"),
        ("SPY", "S&P 500", "#1f77b4"),
        ("GBTC", "Bitcoin", "#FF9900"),
        ("AGG", "Bonds", "#2ca02c"),
        ("EWY", "KOSPI", "#d62728"),
        ("QQQ", "Nasdaq", "#9467bd"),
        ("VNQ", "Real Estate", "#8c564b"),
    ];

    assets
        .into_iter()
        .map(|(symbol, name, color)| Asset {
            symbol: symbol.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file present, using built-in defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "numbered", "slopes")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "numbered", "slopes")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn relay_base_url(&self) -> &str {
        self.providers
            .relay
            .as_ref()
            .map_or(DEFAULT_RELAY_URL, |p| &p.base_url)
    }

    pub fn upstream_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or(DEFAULT_UPSTREAM_URL, |p| &p.base_url)
    }

    /// Relay listening port: flag beats the `PORT` env var beats the config
    /// file beats the built-in default.
    pub fn resolve_port(&self, flag: Option<u16>) -> u16 {
        flag.or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
        })
        .or(self.server.as_ref().map(|s| s.port))
        .unwrap_or(DEFAULT_PORT)
    }
}
