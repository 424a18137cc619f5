use crate::client::types::DEFAULT_PAGE_SIZE;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use tracing::{debug, info};

const CONFIG_PATH_ENV: &str = "REALTY_SEARCH_CONFIG";
const API_BASE_URL_ENV: &str = "API_BASE_URL";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Marketplace backend, without trailing `/api`
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub page_size: u32,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: 30,
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
            user_agent: concat!("realty-search/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file named by `REALTY_SEARCH_CONFIG` if set.
    /// `API_BASE_URL` overrides the configured backend.
    pub fn load() -> Result<Config> {
        dotenv().ok();

        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                info!("Loaded config from {}", path);
                Config::from_toml(&raw).with_context(|| format!("Invalid config file {}", path))?
            }
            Err(_) => {
                debug!("{} not set, using default config", CONFIG_PATH_ENV);
                Config::default()
            }
        };

        if let Ok(base_url) = env::var(API_BASE_URL_ENV) {
            config.api_base_url = base_url;
        }

        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Config> {
        Ok(toml::from_str(raw)?)
    }

    pub fn for_tests() -> Config {
        Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_seconds: 1,
            page_size: 5,
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            api_base_url = "https://api.example.com"
            page_size = 24
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.page_size, 24);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::from_toml("page_size = \"many\"").is_err());
    }
}
