//! Configuration management
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Optional `config/agro.toml`
//! 3. Environment variable overrides with AGRO__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::advisory::AdvisoryThresholds;
use crate::constants::{DEFAULT_CITY, DEFAULT_CROP, OPENWEATHERMAP_API_BASE};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub openweathermap: OpenWeatherMapConfig,

    pub defaults: DefaultsConfig,

    /// Advisory thresholds, every field optional
    #[serde(default)]
    pub thresholds: AdvisoryThresholds,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenWeatherMapConfig {
    /// API key; tools that fetch forecasts fail without it
    pub api_key: Option<String>,

    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    pub city: String,

    pub crop: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("openweathermap.api_base", OPENWEATHERMAP_API_BASE)?
            .set_default("defaults.city", DEFAULT_CITY)?
            .set_default("defaults.crop", DEFAULT_CROP)?
            .add_source(File::with_name("config/agro").required(false))
            .add_source(
                Environment::with_prefix("AGRO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// The API key, ignoring blanks and the documented placeholder
    pub fn api_key(&self) -> Option<&str> {
        self.openweathermap
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != "YOUR_API_KEY_HERE")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweathermap: OpenWeatherMapConfig {
                api_key: None,
                api_base: OPENWEATHERMAP_API_BASE.to_string(),
            },
            defaults: DefaultsConfig {
                city: DEFAULT_CITY.to_string(),
                crop: DEFAULT_CROP.to_string(),
            },
            thresholds: AdvisoryThresholds::default(),
        }
    }
}
