use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix for every environment variable that overrides the config file.
pub const ENV_PREFIX: &str = "FORGE_";

/// Share link embedded in social posts after a successful launch.
pub const DEFAULT_APP_URL: &str = "https://forge-chi.vercel.app/";

/// Longest symbol the factory form accepts.
pub const DEFAULT_SYMBOL_MAX_LEN: usize = 15;

// ---------------------------------------------------------------------------
// Fee policy
// ---------------------------------------------------------------------------

/// How the creation fee is obtained, and with it how the initial supply is
/// passed to the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicyKind {
    /// Read `CREATION_FEE()` from the factory; supply is sent unscaled.
    #[default]
    OnChain,
    /// Attach `fixed_fee_eth`; supply is scaled by 10^18 before sending.
    Fixed,
}

impl std::str::FromStr for FeePolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_chain" | "onchain" | "dynamic" => Ok(Self::OnChain),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown fee policy: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ForgeConfig
// ---------------------------------------------------------------------------

/// Application configuration stored at `~/.forge/config.json`.
///
/// Secrets (`private_key`, `explorer_api_key`) are never written to the file;
/// they are only ever read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    #[serde(skip)]
    pub private_key: Option<String>,
    #[serde(skip)]
    pub explorer_api_key: Option<String>,

    // Network
    pub chain: String,
    pub factory_address: Option<String>,
    /// Custom RPC endpoints keyed by chain slug (`base`, `ethereum`).
    pub rpc_urls: HashMap<String, String>,
    /// Optional path to a compiled factory artifact (`{"abi": [...]}`).
    pub factory_abi_path: Option<PathBuf>,

    // Launch
    pub fee_policy: FeePolicyKind,
    pub fixed_fee_eth: String,
    pub symbol_max_len: usize,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
    pub connector_preference: Vec<String>,

    // Sharing
    pub app_url: String,

    // Verification listener
    pub verify_from_block: Option<u64>,
    pub verify_poll_interval_secs: u64,
    pub verify_block_window: u64,

    // General
    pub log_level: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            explorer_api_key: None,
            chain: "base".into(),
            factory_address: None,
            rpc_urls: HashMap::new(),
            factory_abi_path: None,
            fee_policy: FeePolicyKind::OnChain,
            fixed_fee_eth: "0.006".into(),
            symbol_max_len: DEFAULT_SYMBOL_MAX_LEN,
            receipt_poll_interval_ms: 2_000,
            receipt_timeout_secs: 120,
            connector_preference: vec!["miniApp".into(), "localKey".into(), "injected".into()],
            app_url: DEFAULT_APP_URL.into(),
            verify_from_block: None,
            verify_poll_interval_secs: 12,
            verify_block_window: 2_000,
            log_level: "info".into(),
        }
    }
}

impl ForgeConfig {
    /// Returns the base config directory: `~/.forge/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".forge"))
    }

    /// Returns the config file path: `~/.forge/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.forge/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        for dir in [Self::base_dir()?, Self::logs_dir()?] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads `.env`, the config file (creating a default one when missing),
    /// then applies `FORGE_*` environment overrides.
    pub fn load() -> Result<Self> {
        load_env_file();
        Self::ensure_dirs()?;
        let mut config = Self::load_from_path(&Self::config_path()?)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file path, writing defaults if it is missing.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path (secrets are excluded via `#[serde(skip)]`).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Read `FORGE_*` variables from the process environment and apply them.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("Failed to read FORGE_* environment variables")?;
        self.apply_overrides(overrides)
    }

    /// Apply already-parsed overrides. `rpc_url` targets the selected chain.
    pub fn apply_overrides(&mut self, overrides: EnvOverrides) -> Result<()> {
        if let Some(chain) = overrides.chain {
            self.chain = chain.trim().to_ascii_lowercase();
        }
        if let Some(address) = overrides.factory_address {
            self.factory_address = Some(address.trim().to_string());
        }
        if let Some(url) = overrides.rpc_url {
            self.rpc_urls.insert(self.chain.clone(), url.trim().to_string());
        }
        if let Some(policy) = overrides.fee_policy {
            self.fee_policy = policy
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid FORGE_FEE_POLICY: {e}"))?;
        }
        if let Some(path) = overrides.factory_abi_path {
            self.factory_abi_path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if overrides.private_key.is_some() {
            self.private_key = overrides.private_key.filter(|k| !k.trim().is_empty());
        }
        if overrides.explorer_api_key.is_some() {
            self.explorer_api_key = overrides.explorer_api_key.filter(|k| !k.trim().is_empty());
        }
        debug!(chain = %self.chain, policy = ?self.fee_policy, "environment overrides applied");
        Ok(())
    }

    /// Reject values that would make the launch flow misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.symbol_max_len == 0 {
            anyhow::bail!("Config error: symbol_max_len must be at least 1");
        }
        if self.receipt_timeout_secs == 0 || self.receipt_poll_interval_ms == 0 {
            anyhow::bail!("Config error: receipt timeout and poll interval must be non-zero");
        }
        if self.verify_block_window == 0 {
            anyhow::bail!("Config error: verify_block_window must be non-zero");
        }
        let app_url = url::Url::parse(&self.app_url)
            .with_context(|| format!("Config error: invalid app_url {}", self.app_url))?;
        if !matches!(app_url.scheme(), "http" | "https") {
            anyhow::bail!("Config error: app_url must be http(s): {}", self.app_url);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Values accepted from `FORGE_*` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvOverrides {
    pub chain: Option<String>,
    pub factory_address: Option<String>,
    pub rpc_url: Option<String>,
    pub fee_policy: Option<String>,
    pub factory_abi_path: Option<PathBuf>,
    pub private_key: Option<String>,
    pub explorer_api_key: Option<String>,
    pub log_level: Option<String>,
}

/// Load a `.env` file from the working directory (or a parent) if one exists.
/// Returns the path that was loaded.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file: {e}");
            None
        }
    }
}
