//! Configuration resolution for desaka-unifier
//!
//! Two-tier priority: environment variables override the TOML file,
//! the TOML file overrides built-in defaults. A missing config file is
//! not an error; defaults apply.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default cap on concurrently resolved products
pub const DEFAULT_MAX_WORKERS: usize = 32;

/// Top-level configuration for a unifier run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifierConfig {
    /// Directory holding the memory namespace files
    pub memory_dir: PathBuf,
    /// Target language code (uppercase, e.g. "CS")
    pub language: String,
    /// Bounded worker pool size for batch resolution
    pub max_workers: usize,
    /// When true, AI-proposed values require human confirmation before commit
    pub confirm_ai_results: bool,
    /// AI oracle settings
    pub oracle: OracleConfig,
}

/// AI oracle connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Disable the oracle entirely (heuristic-only runs)
    pub enabled: bool,
    /// Chat-completions endpoint (OpenAI-compatible)
    pub api_url: String,
    /// API key; without one the pipeline falls back to heuristic-only mode
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Flat delay enforced between consecutive oracle calls
    pub call_delay_ms: u64,
    /// Request timeout. Model latency is unpredictable; keep this generous.
    pub timeout_secs: u64,
}

impl Default for UnifierConfig {
    fn default() -> Self {
        Self {
            memory_dir: PathBuf::from("Memory"),
            language: "CS".to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            confirm_ai_results: false,
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            call_delay_ms: 1000,
            timeout_secs: 180,
        }
    }
}

impl UnifierConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// Priority: ENV > TOML > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
                let parsed: UnifierConfig = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse config failed: {}", e)))?;
                info!("Configuration loaded from {}", p.display());
                parsed
            }
            Some(p) => {
                warn!("Config file {} not found, using defaults", p.display());
                UnifierConfig::default()
            }
            None => UnifierConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `DESAKA_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("DESAKA_MEMORY_DIR") {
            self.memory_dir = PathBuf::from(dir);
        }
        if let Ok(lang) = std::env::var("DESAKA_LANGUAGE") {
            self.language = lang;
        }
        if let Ok(workers) = std::env::var("DESAKA_MAX_WORKERS") {
            match workers.parse() {
                Ok(n) => self.max_workers = n,
                Err(_) => warn!("Ignoring non-numeric DESAKA_MAX_WORKERS={}", workers),
            }
        }
        if let Ok(key) = std::env::var("DESAKA_ORACLE_API_KEY") {
            if !key.trim().is_empty() {
                self.oracle.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("DESAKA_ORACLE_API_URL") {
            self.oracle.api_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }
        if self.max_workers == 0 {
            return Err(Error::Config("max_workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
