//! CLI settings
//!
//! Resolved in layers, later ones winning:
//! 1. TOML file (`--config`, else `~/.ftpusers/config.toml` if present)
//! 2. `.env` in the working directory or a parent (loaded before parsing)
//! 3. Environment (`DBCON`)
//! 4. Command-line flags
//!
//! Layers 2-4 reach us through clap, which reads `DBCON` as the fallback
//! for `--datasource`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ftpusers_data::RetryPolicy;
use serde::Deserialize;

/// Settings file contents. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `<scheme>://...` connection string
    pub datasource: Option<String>,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub attempts: Option<u32>,
    pub delay_secs: Option<u64>,
}

/// Values that came in on the command line (or via clap's env fallback)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub datasource: Option<String>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_secs: Option<u64>,
}

impl Settings {
    /// Default settings path: ~/.ftpusers/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ftpusers/config.toml")
    }

    /// Load the settings file.
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file (invalid TOML): {}", path.display()))
    }

    pub fn merge(mut self, overrides: Overrides) -> Self {
        if overrides.datasource.is_some() {
            self.datasource = overrides.datasource;
        }
        if overrides.retry_attempts.is_some() {
            self.retry.attempts = overrides.retry_attempts;
        }
        if overrides.retry_delay_secs.is_some() {
            self.retry.delay_secs = overrides.retry_delay_secs;
        }
        self
    }

    pub fn datasource(&self) -> Result<&str> {
        self.datasource
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "no datasource configured\n\n\
                     Set DBCON, pass --datasource, or add `datasource` to {}",
                    Self::default_path().display()
                )
            })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy::new(
            self.retry.attempts.unwrap_or(defaults.attempts),
            self.retry
                .delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.delay),
        )
    }
}
