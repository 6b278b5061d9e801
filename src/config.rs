use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::pip::MIN_WINDOW;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Initial nearest-candidate window; doubled until the result is certified
    pub initial_window: usize,
    /// Boundary vertices included in debug traces
    pub vertex_sample: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            initial_window: MIN_WINDOW,
            vertex_sample: 3,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classifier.initial_window < MIN_WINDOW {
            anyhow::bail!(
                "classifier.initial_window must be at least {}, got {}",
                MIN_WINDOW,
                self.classifier.initial_window
            );
        }
        Ok(())
    }
}
