use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SEASON: &str = "2025";
const DEFAULT_CSV_DIR: &str = "data/sportsdata";
const DEFAULT_STATIC_DIR: &str = "client/dist";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CACHE_DURATION_SECS: u64 = 300;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub odds_api_key: Option<String>,
    pub sportsdata_api_key: Option<String>,
    pub season: String,
    pub csv_dir: PathBuf,
    pub static_dir: PathBuf,
    pub port: u16,
    pub cache_duration: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let parse_u64 = |name: &str, default: u64| -> Result<u64> {
            match get(name) {
                Some(raw) => raw
                    .parse::<u64>()
                    .with_context(|| format!("{} must be a whole number, got {:?}", name, raw)),
                None => Ok(default),
            }
        };

        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };
        let cache_secs = parse_u64("CACHE_DURATION_SECS", DEFAULT_CACHE_DURATION_SECS)?;
        let timeout_secs = parse_u64("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            odds_api_key: get("ODDS_API_KEY"),
            sportsdata_api_key: get("SPORTSDATA_API_KEY"),
            season: get_or("NFL_SEASON", DEFAULT_SEASON),
            csv_dir: PathBuf::from(get_or("SPORTSDATA_CSV_DIR", DEFAULT_CSV_DIR)),
            static_dir: PathBuf::from(get_or("STATIC_DIR", DEFAULT_STATIC_DIR)),
            port,
            cache_duration: Duration::from_secs(cache_secs),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.odds_api_key.is_none());
        assert!(config.sportsdata_api_key.is_none());
        assert_eq!(config.season, "2025");
        assert_eq!(config.csv_dir, PathBuf::from("data/sportsdata"));
        assert_eq!(config.static_dir, PathBuf::from("client/dist"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_duration, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_empty_keys_are_unset() {
        let vars = [("ODDS_API_KEY", "  "), ("SPORTSDATA_API_KEY", "abc123")];
        let config = config_from(&vars).unwrap();
        assert!(config.odds_api_key.is_none());
        assert_eq!(config.sportsdata_api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("NFL_SEASON", "2024"),
            ("PORT", "3000"),
            ("CACHE_DURATION_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.season, "2024");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_duration, Duration::from_secs(60));
    }

    #[test]
    fn test_bad_numbers_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("REQUEST_TIMEOUT_SECS", "-1")]).is_err());
    }
}
