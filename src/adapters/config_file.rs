//! JSON settings file adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON document.  Missing
//! fields fall back to their defaults; out-of-range values are rejected,
//! never clamped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::MonitorConfig;
use crate::error::ConfigError;

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and write `config`, pretty-printed.
    pub fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, json).map_err(|e| {
            warn!("config: cannot write {}: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("config: saved to {}", self.path.display());
        Ok(())
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: MonitorConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("config: {} is not valid JSON: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }
}
