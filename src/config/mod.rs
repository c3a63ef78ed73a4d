use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Locale served by this instance; requests for any other locale are
    /// rejected at the boundary.
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub predictor: PredictorConfig,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            server: ServerConfig::default(),
            predictor: PredictorConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, falling back to defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.is_empty() {
            return Err(ConfigError::Validation("locale must not be empty".into()));
        }
        if self.predictor.max_candidates == 0 {
            return Err(ConfigError::Validation(
                "predictor.max_candidates must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ── HTTP server ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ── Predictor service ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "default_predictor_url")]
    pub url: String,
    #[serde(default = "default_predictor_timeout")]
    pub timeout_secs: u64,
    /// Candidates kept per request after ranking.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            url: default_predictor_url(),
            timeout_secs: default_predictor_timeout(),
            max_candidates: default_max_candidates(),
        }
    }
}

// ── Simulation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { seed: 0 }
    }
}

fn default_locale() -> String {
    "en-US".into()
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8400
}

fn default_predictor_url() -> String {
    "http://127.0.0.1:8500".into()
}

fn default_predictor_timeout() -> u64 {
    30
}

fn default_max_candidates() -> usize {
    5
}
