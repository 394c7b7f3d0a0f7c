//! Selector configuration, buildable in code or loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_PINNED_COLUMNS: usize = 3;
pub const DEFAULT_STATE_KEY: &str = "finboard.columnSelector.state";
pub const DEFAULT_VIEWS_KEY: &str = "finboard.columnSelector.customViews";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a [`ColumnSelector`](crate::ColumnSelector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Upper bound on pinned columns. Zero disables pinning.
    pub max_pinned_columns: usize,
    /// Storage key for the selection state blob.
    pub state_key: String,
    /// Storage key for the custom view list.
    pub views_key: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_pinned_columns: DEFAULT_MAX_PINNED_COLUMNS,
            state_key: DEFAULT_STATE_KEY.to_string(),
            views_key: DEFAULT_VIEWS_KEY.to_string(),
        }
    }
}

impl SelectorConfig {
    #[must_use]
    pub fn with_max_pinned(mut self, max: usize) -> Self {
        self.max_pinned_columns = max;
        self
    }

    /// Namespace both storage keys, so several tables can keep separate state.
    #[must_use]
    pub fn scoped(mut self, scope: &str) -> Self {
        self.state_key = format!("{scope}.{}", self.state_key);
        self.views_key = format!("{scope}.{}", self.views_key);
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_key.trim().is_empty() || self.views_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage keys must not be empty".into()));
        }
        if self.state_key == self.views_key {
            return Err(ConfigError::Invalid(format!(
                "state_key and views_key must differ (both '{}')",
                self.state_key
            )));
        }
        Ok(())
    }
}
