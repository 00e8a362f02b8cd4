use crate::ai::{GeminiConfig, GenerationSettings};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-thinking-exp-01-21";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PLACEHOLDER_KEYS: [&str; 4] = ["your_api_key_here", "your-api-key", "changeme", "replace_me"];
const MIN_KEY_LEN: usize = 20;

const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:5176",
    "https://test-generator-ai.vercel.app",
    "https://test-generator-ai.vercel.app/",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("GEMINI_API_KEY does not look like a real key: {0}")]
    InvalidApiKey(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub generation_interval: Duration,
    pub generation_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        check_api_key(&api_key)?;

        let timeout_secs = parse_or("GEMINI_TIMEOUT_SECS", var("GEMINI_TIMEOUT_SECS"), 120u64)?;
        let interval_ms = parse_or("GENERATION_INTERVAL_MS", var("GENERATION_INTERVAL_MS"), 1000u64)?;
        let burst = parse_or("GENERATION_BURST", var("GENERATION_BURST"), 1u32)?;
        let port = parse_or("PORT", var("PORT"), 5000u16)?;

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
                settings: GenerationSettings::default(),
            },
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            cors_origin: var("CORS_ORIGIN"),
            generation_interval: Duration::from_millis(interval_ms),
            generation_burst: burst.max(1),
        })
    }

    /// Origins allowed by CORS. The configured extra origin is accepted with and without a trailing slash.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(origin) = &self.cors_origin {
            let bare = origin.trim_end_matches('/');
            origins.push(bare.to_string());
            origins.push(format!("{bare}/"));
        }
        origins
    }
}

fn check_api_key(key: &str) -> Result<(), ConfigError> {
    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidApiKey("contains whitespace"));
    }
    if key.len() < MIN_KEY_LEN {
        return Err(ConfigError::InvalidApiKey("too short"));
    }
    let lowered = key.to_ascii_lowercase();
    if PLACEHOLDER_KEYS.iter().any(|p| lowered.contains(p)) {
        return Err(ConfigError::InvalidApiKey("placeholder value"));
    }
    Ok(())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
