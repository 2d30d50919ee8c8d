use crate::backend::ollama::DEFAULT_HOST;
use crate::error::{Result, TranslateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "translategemma:12b";
pub const DEFAULT_GLOSSARY_PATH: &str = "glossary.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub ollama_host: String,
    pub glossary_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_HOST.to_string(),
            glossary_path: PathBuf::from(DEFAULT_GLOSSARY_PATH),
            timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Some(file_config) = Self::parse_file(&contents, &config_path) {
                    config = file_config;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn parse_file(contents: &str, path: &Path) -> Option<Self> {
        match toml::from_str::<Config>(contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Override fields from environment-style lookups.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(model) = var("TRANSLATEGEMMA_MODEL") {
            self.model = model;
        }
        if let Some(host) = var("OLLAMA_HOST") {
            self.ollama_host = host;
        }
        if let Some(path) = var("CODETRANSLATE_GLOSSARY") {
            self.glossary_path = PathBuf::from(path);
        }
        if let Some(timeout) = var("CODETRANSLATE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(TranslateError::Config("Model name must not be empty".to_string()));
        }

        if self.ollama_host.trim().is_empty() {
            return Err(TranslateError::Config(
                "Ollama host must not be empty. Set OLLAMA_HOST, e.g. http://localhost:11434"
                    .to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(TranslateError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("codetranslate").join("config.toml"))
    }
}
