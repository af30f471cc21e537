use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "fourier.toml";

/// Defaults for the command-line flags, read from `fourier.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub variable: String,
    pub terms: u32,
    pub show_steps: bool,
    pub json: bool,
    pub log_level: String,
    pub max_expand_exponent: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            variable: "x".to_string(),
            terms: 3,
            show_steps: false,
            json: false,
            log_level: "warn".to_string(),
            max_expand_exponent: cas_engine::SimplifyOptions::default().max_expand_exponent,
        }
    }
}

impl CliConfig {
    /// Load `path`, falling back to the defaults when it is missing or
    /// malformed.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Error parsing config file: {}. Using defaults.", e),
                },
                Err(e) => eprintln!("Error reading config file: {}. Using defaults.", e),
            }
        }
        Self::default()
    }

    pub fn simplify_options(&self) -> cas_engine::SimplifyOptions {
        cas_engine::SimplifyOptions {
            max_expand_exponent: self.max_expand_exponent,
            ..Default::default()
        }
    }
}
