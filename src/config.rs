//! Environment-driven configuration
//!
//! | Variable            | Default                          |
//! |---------------------|----------------------------------|
//! | `CATALOG_PATH`      | `public/data/mushrooms.json`     |
//! | `CATALOG_URL`       | unset (file source is used)      |
//! | `CLASSIFIER_URL`    | `http://localhost:5000/predict`  |
//! | `PORT`              | `3000`                           |
//! | `FETCH_TIMEOUT_SECS`| `30`                             |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::classifier_client::DEFAULT_CLASSIFIER_URL;
use crate::store::CatalogSource;

pub const DEFAULT_CATALOG_PATH: &str = "public/data/mushrooms.json";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub catalog_url: Option<String>,
    pub classifier_url: String,
    pub port: u16,
    pub fetch_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            catalog_url: None,
            classifier_url: DEFAULT_CLASSIFIER_URL.to_string(),
            port: DEFAULT_PORT,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_blank("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => defaults.port,
        };

        let fetch_timeout = match non_blank("FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("FETCH_TIMEOUT_SECS must be whole seconds, got {:?}", raw))?,
            ),
            None => defaults.fetch_timeout,
        };

        Ok(Self {
            catalog_path: non_blank("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            catalog_url: non_blank("CATALOG_URL"),
            classifier_url: non_blank("CLASSIFIER_URL").unwrap_or(defaults.classifier_url),
            port,
            fetch_timeout,
        })
    }

    /// HTTP source when `CATALOG_URL` is set, the file otherwise.
    pub fn catalog_source(&self) -> Result<CatalogSource> {
        match &self.catalog_url {
            Some(url) => CatalogSource::http(url.clone(), self.fetch_timeout)
                .context("Failed to build catalog HTTP client"),
            None => Ok(CatalogSource::file(self.catalog_path.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(matches!(config.catalog_source().unwrap(), CatalogSource::File(_)));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CATALOG_URL", "http://cdn.local/data/mushrooms.json"),
            ("CLASSIFIER_URL", "http://ml.local/predict"),
            ("PORT", "8080"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("CATALOG_PATH", "  "),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.classifier_url, "http://ml.local/predict");
        assert!(matches!(config.catalog_source().unwrap(), CatalogSource::Http { .. }));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_SECS", "-1")])).is_err());
    }
}
