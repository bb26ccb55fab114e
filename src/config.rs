use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::acquirer::{request_interval, SAFETY_MARGIN};
use crate::error::{PriceRadarError, Result};

pub const DEFAULT_OUTPUT_PATH: &str = "data/prices.json";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Free-tier quota of the default model.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 15;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const OUTPUT_VAR: &str = "PRICE_RADAR_OUTPUT";
pub const MODEL_VAR: &str = "PRICE_RADAR_MODEL";
pub const RPM_VAR: &str = "PRICE_RADAR_RPM";

#[derive(Debug, Clone)]
pub struct RadarConfig {
    pub output_path: PathBuf,
    pub model: String,
    pub requests_per_minute: u32,
    pub safety_margin: Duration,
    pub api_key: Option<String>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            model: DEFAULT_MODEL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            safety_margin: SAFETY_MARGIN,
            api_key: None,
        }
    }
}

impl RadarConfig {
    /// Defaults overridden by the process environment and a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(OUTPUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.output_path = PathBuf::from(path);
        }
        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(raw) = lookup(RPM_VAR) {
            config.requests_per_minute = parse_rpm(&raw)?;
        }
        config.api_key = lookup(API_KEY_VAR).filter(|v| !v.trim().is_empty());

        Ok(config)
    }

    /// The credential for the generation service. Missing is fatal.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            PriceRadarError::MissingConfiguration(format!(
                "{} environment variable not set",
                API_KEY_VAR
            ))
        })
    }

    pub fn request_interval(&self) -> Duration {
        request_interval(self.requests_per_minute, self.safety_margin)
    }
}

pub fn parse_rpm(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(rpm) if rpm > 0 => Ok(rpm),
        Ok(_) => Err(PriceRadarError::InvalidConfiguration {
            key: RPM_VAR.to_string(),
            details: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(PriceRadarError::InvalidConfiguration {
            key: RPM_VAR.to_string(),
            details: format!("'{}': {}", raw, e),
        }),
    }
}
