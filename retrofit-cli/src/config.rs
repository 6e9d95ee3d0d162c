//! Layered configuration for the wizard CLI.
//!
//! Sources are applied in order, later ones winning:
//!
//! 1. an optional TOML file (`[backend]` and `[wizard]` tables),
//! 2. the `RETROFIT_API_URL` environment variable,
//! 3. command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use retrofit_core::{BackendConfig, WizardConfig};

/// Environment variable overriding `backend.base_url`.
pub const API_URL_ENV: &str = "RETROFIT_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("configuration validation failed: {0}")]
    Invalid(String),
}

/// Everything the CLI needs to build a backend and a wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub wizard: WizardConfig,
}

/// Values given on the command line; `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub backend: Option<String>,
    pub api_url: Option<String>,
    pub min_postal_code_len: Option<usize>,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Blank values are ignored.
    pub fn apply_env_url(
        &mut self,
        value: Option<&str>,
    ) {
        if let Some(url) = value.map(str::trim).filter(|url| !url.is_empty()) {
            debug!(url, "base URL taken from {}", API_URL_ENV);
            self.backend.base_url = url.to_string();
        }
    }

    pub fn apply_flags(
        &mut self,
        flags: &FlagOverrides,
    ) {
        if let Some(backend) = &flags.backend {
            self.backend.backend = backend.trim().to_lowercase();
        }
        if let Some(url) = &flags.api_url {
            self.backend.base_url = url.trim().to_string();
        }
        if let Some(len) = flags.min_postal_code_len {
            self.wizard.min_postal_code_len = len;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("backend name is empty".to_string()));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend base_url is empty".to_string()));
        }
        if self.wizard.min_postal_code_len == 0 {
            return Err(ConfigError::Invalid(
                "wizard.min_postal_code_len must be at least 1".to_string(),
            ));
        }
        if self.wizard.specialization.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "wizard.specialization is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds the effective configuration from all three layers.
///
/// `env_url` is the value of [`API_URL_ENV`], read by the caller.
pub fn resolve(
    path: Option<&Path>,
    env_url: Option<&str>,
    flags: &FlagOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_env_url(env_url);
    config.apply_flags(flags);
    config.validate()?;
    Ok(config)
}
