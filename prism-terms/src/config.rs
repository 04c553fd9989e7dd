//! Configuration for terms aggregations
//!
//! Loaded from a TOML file; every section and field has a default.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct TermsConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of tables checked out at the same time
    #[serde(default = "default_max_tables")]
    pub max_tables: usize,
    /// Released tables kept around for reuse
    #[serde(default = "default_max_idle")]
    pub max_idle: usize,
    /// Bucket capacity of newly allocated tables
    #[serde(default)]
    pub initial_capacity: usize,
    /// Released tables above this bucket capacity shrink back to
    /// `initial_capacity` before they are kept
    #[serde(default = "default_max_retained_capacity")]
    pub max_retained_capacity: usize,
}

fn default_max_tables() -> usize {
    64
}

fn default_max_idle() -> usize {
    16
}

fn default_max_retained_capacity() -> usize {
    65_536
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_tables: default_max_tables(),
            max_idle: default_max_idle(),
            initial_capacity: 0,
            max_retained_capacity: default_max_retained_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SelectionConfig {
    /// Result sizes below this use a bounded heap, larger ones a bounded
    /// ordered set. Tuning only; both produce the same buckets.
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,
    /// Number of buckets returned when a request has no `size`
    #[serde(default = "default_size")]
    pub default_size: usize,
}

fn default_queue_limit() -> usize {
    5000
}

fn default_size() -> usize {
    10
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            queue_limit: default_queue_limit(),
            default_size: default_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter string, overridden by RUST_LOG
    #[serde(default = "default_level")]
    pub level: String,
    /// Log output format: "pretty" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl TermsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TermsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.max_tables == 0 {
            return Err(anyhow!("pool.max_tables must be at least 1"));
        }
        if self.selection.queue_limit == 0 {
            return Err(anyhow!("selection.queue_limit must be at least 1"));
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(anyhow!("unknown logging.format '{}'", other)),
        }
    }
}
