//! Configuration management for Recast.
//!
//! Provides runtime configuration for rewrite chains and the in-memory
//! reference engine.

use std::path::Path;

use common_error::{RecastError, RecastResult};
use serde::{Deserialize, Serialize};

/// Global Recast configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecastConfig {
    /// Rewrite configuration.
    pub rewrite: RewriteConfig,
    /// Execution configuration.
    pub execution: ExecutionConfig,
}

impl RecastConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> RecastResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RecastError::config(format!("invalid configuration: {e}")))
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> RecastResult<Self> {
        toml::from_str(toml).map_err(|e| RecastError::config(format!("invalid configuration: {e}")))
    }

    /// Read a configuration file, choosing the format from its extension.
    ///
    /// `.toml` files are parsed as TOML; everything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> RecastResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        };
        parsed.map_err(|e| match e {
            RecastError::ConfigError(msg) => {
                RecastError::config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Serialize this configuration as pretty-printed JSON.
    pub fn to_json(&self) -> RecastResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Enable or disable rewrite tracing.
    #[must_use]
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.rewrite.enable_trace = enable;
        self
    }

    /// Enable or disable the case-insensitive equality rewrite.
    #[must_use]
    pub fn with_case_insensitive(mut self, enable: bool) -> Self {
        self.rewrite.case_insensitive = enable;
        self
    }

    /// Cap the number of rows a blocking operator may buffer.
    #[must_use]
    pub fn with_max_buffered_rows(mut self, max: usize) -> Self {
        self.execution.max_buffered_rows = Some(max);
        self
    }
}

/// Rewrite chain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Install the case-insensitive string equality rewrite.
    pub case_insensitive: bool,
    /// Record before/after snapshots for every rewriter application.
    pub enable_trace: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            enable_trace: false,
        }
    }
}

/// Execution configuration for the in-memory engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum rows buffered by sorting; `None` means unbounded.
    pub max_buffered_rows: Option<usize>,
}
