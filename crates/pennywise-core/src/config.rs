//! Runtime configuration
//!
//! ## Resolution
//!
//! 1. Embedded defaults
//! 2. TOML file: explicit path, else `PENNYWISE_CONFIG`, else
//!    `~/.local/share/pennywise/config.toml` when it exists
//! 3. Environment overrides (`PENNYWISE_STORE`, `PENNYWISE_DB`, `AI_BACKEND`,
//!    `OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`,
//!    `OPENAI_COMPATIBLE_API_KEY`, `PENNYWISE_HOST`, `PENNYWISE_PORT`)
//!
//! ```toml
//! [store]
//! backend = "sqlite"
//! path = "pennywise.db"
//!
//! [ai]
//! backend = "openai_compatible"
//! host = "http://localhost:8080"
//! model = "gpt-4o"
//!
//! [forecast]
//! trend_policy = "constant"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::forecast::TrendPolicy;

pub const CONFIG_ENV: &str = "PENNYWISE_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "demo" => Ok(Self::Memory),
            _ => Err(Error::Config(format!("Unknown store backend: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiBackendKind {
    OpenAICompatible,
    Mock,
    None,
}

impl FromStr for AiBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai_compatible" | "openai-compatible" | "openai" => Ok(Self::OpenAICompatible),
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::None),
            _ => Err(Error::Config(format!("Unknown AI backend: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// SQLite database file
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub backend: AiBackendKind,
    pub host: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means same-origin only
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastConfig {
    pub prediction_lookback_days: u32,
    pub recommendation_lookback_days: u32,
    pub trend_policy: TrendPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub ai: AiConfig,
    pub server: ServerConfig,
    pub forecast: ForecastConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Sqlite,
                path: "pennywise.db".to_string(),
            },
            ai: AiConfig {
                backend: AiBackendKind::OpenAICompatible,
                host: None,
                model: "gpt-4o".to_string(),
                api_key: None,
                timeout_secs: 60,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                allowed_origins: Vec::new(),
            },
            forecast: ForecastConfig {
                prediction_lookback_days: 90,
                recommendation_lookback_days: 30,
                trend_policy: TrendPolicy::Constant,
            },
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pennywise").join("config.toml"))
}

impl Config {
    /// Resolve configuration from file and process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                debug!(path = %path.display(), "Loaded config file");
                Self::from_toml(&content)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loaded config file");
                    Self::from_toml(&fs::read_to_string(&path)?)?
                }
                None => Self::default(),
            },
        };

        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(store) = raw.store {
            if let Some(backend) = store.backend {
                config.store.backend = backend.parse()?;
            }
            if let Some(path) = store.path {
                config.store.path = path;
            }
        }

        if let Some(ai) = raw.ai {
            if let Some(backend) = ai.backend {
                config.ai.backend = backend.parse()?;
            }
            if ai.host.is_some() {
                config.ai.host = ai.host;
            }
            if let Some(model) = ai.model {
                config.ai.model = model;
            }
            if ai.api_key.is_some() {
                config.ai.api_key = ai.api_key;
            }
            if let Some(timeout) = ai.timeout_secs {
                config.ai.timeout_secs = timeout;
            }
        }

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                config.server.allowed_origins = origins;
            }
        }

        if let Some(forecast) = raw.forecast {
            if let Some(days) = forecast.prediction_lookback_days {
                config.forecast.prediction_lookback_days = days;
            }
            if let Some(days) = forecast.recommendation_lookback_days {
                config.forecast.recommendation_lookback_days = days;
            }
            if let Some(policy) = forecast.trend_policy {
                config.forecast.trend_policy = policy.parse().map_err(Error::Config)?;
            }
        }

        Ok(config)
    }

    /// Apply environment overrides read through `get`
    pub fn apply_env_with<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = get("PENNYWISE_STORE") {
            self.store.backend = backend.parse()?;
        }
        if let Some(path) = get("PENNYWISE_DB") {
            self.store.path = path;
        }
        if let Some(backend) = get("AI_BACKEND") {
            self.ai.backend = backend.parse()?;
        }
        if let Some(host) = get("OPENAI_COMPATIBLE_HOST") {
            self.ai.host = Some(host);
        }
        if let Some(model) = get("OPENAI_COMPATIBLE_MODEL") {
            self.ai.model = model;
        }
        if let Some(key) = get("OPENAI_COMPATIBLE_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(host) = get("PENNYWISE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PENNYWISE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PENNYWISE_PORT: {}", port)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    store: Option<RawStore>,
    ai: Option<RawAi>,
    server: Option<RawServer>,
    forecast: Option<RawForecast>,
}

#[derive(Debug, Deserialize)]
struct RawStore {
    backend: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    backend: Option<String>,
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    prediction_lookback_days: Option<u32>,
    recommendation_lookback_days: Option<u32>,
    trend_policy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.path, "pennywise.db");
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.forecast.prediction_lookback_days, 90);
        assert_eq!(config.forecast.recommendation_lookback_days, 30);
        assert_eq!(config.forecast.trend_policy, TrendPolicy::Constant);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [ai]
            host = "http://localhost:8080/"
            model = "llama3.2"

            [forecast]
            trend_policy = "realized"
            "#,
        )
        .unwrap();

        assert_eq!(config.ai.host.as_deref(), Some("http://localhost:8080/"));
        assert_eq!(config.ai.model, "llama3.2");
        assert_eq!(config.ai.timeout_secs, 60);
        assert_eq!(config.forecast.trend_policy, TrendPolicy::Realized);
        assert_eq!(config.store.path, "pennywise.db");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml("[store]\nbackend = \"postgres\"").is_err());
        assert!(Config::from_toml("[forecast]\ntrend_policy = \"linear\"").is_err());
        assert!(Config::from_toml("[server]\nport = \"abc\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("[store]\npath = \"file.db\"").unwrap();
        let env: HashMap<&str, &str> = [
            ("PENNYWISE_DB", "env.db"),
            ("PENNYWISE_STORE", "memory"),
            ("AI_BACKEND", "mock"),
            ("PENNYWISE_PORT", "8080"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.path, "env.db");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.ai.backend, AiBackendKind::Mock);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_bad_port() {
        let mut config = Config::default();
        let result = config.apply_env_with(|key| {
            (key == "PENNYWISE_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"0.0.0.0\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        assert!(Config::load(Some(Path::new("/nonexistent/pennywise.toml"))).is_err());
    }
}
