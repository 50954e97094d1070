use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Override RPC URL for the selected chain (skips the built-in list).
    #[serde(default)]
    pub rpc_url: String,
    /// Path of the persisted chain-selection file.
    #[serde(default = "default_selection_path")]
    pub selection_path: String,
    /// Gateway contract version to talk to.
    #[serde(default = "default_contract_version")]
    pub contract_version: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WalletConfig {
    /// Hex signing key - loaded from env PEERBET_PRIVATE_KEY, never the file.
    #[serde(default, skip_deserializing)]
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Watch-mode refresh interval in seconds.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Upper bound on any single read before it is reported as timed out.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_selection_path() -> String {
    ".peerbet-chain".to_string()
}
fn default_contract_version() -> String {
    "V0".to_string()
}
fn default_refresh_secs() -> u64 {
    15
}
fn default_read_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            selection_path: default_selection_path(),
            contract_version: default_contract_version(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables for secrets.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.overlay_env();
        Ok(config)
    }

    /// Load a default config with env-only secrets (no file needed).
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(url) = std::env::var("PEERBET_RPC_URL") {
            config.network.rpc_url = url;
        }
        config.overlay_env();
        config
    }

    fn overlay_env(&mut self) {
        // The signing key never lives in the config file.
        if let Ok(key) = std::env::var("PEERBET_PRIVATE_KEY") {
            self.wallet.private_key = key;
        }
    }

    pub fn has_signer(&self) -> bool {
        !self.wallet.private_key.is_empty()
    }
}
