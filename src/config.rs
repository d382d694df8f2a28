use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::geocoder::{NominatimConfig, PUBLIC_NOMINATIM_URL};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub min_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: PUBLIC_NOMINATIM_URL.to_string(),
            user_agent: "ngo_locator".to_string(),
            min_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl GeocoderConfig {
    pub fn to_nominatim(&self) -> NominatimConfig {
        NominatimConfig {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            min_delay: Duration::from_millis(self.min_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("ngo_data.csv"),
            output: PathBuf::from("ngo_geocoded.csv"),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load the given file, or fall back to defaults when none is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.geocoder.endpoint, PUBLIC_NOMINATIM_URL);
        assert_eq!(config.geocoder.min_delay_ms, 1000);
        assert_eq!(config.dataset.output, PathBuf::from("ngo_geocoded.csv"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[geocoder]\nendpoint = \"http://localhost:8080\"\nmin_delay_ms = 0\n"
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.geocoder.endpoint, "http://localhost:8080");
        assert_eq!(config.geocoder.user_agent, "ngo_locator");

        let nominatim = config.geocoder.to_nominatim();
        assert_eq!(nominatim.min_delay, Duration::ZERO);
        assert_eq!(nominatim.timeout, Duration::from_secs(30));
        assert_eq!(config.dataset.input, PathBuf::from("ngo_data.csv"));
    }

    #[test]
    fn test_bad_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geocoder\nendpoint = ").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
        assert!(Config::load_or_default(None).is_ok());
    }
}
