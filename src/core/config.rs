//! Describer configuration.
//!
//! Defaults cover a local model server on the standard port. An optional
//! `describer.toml` next to the working directory overrides them, and
//! `DESCRIBER_*` environment variables (a `.env` file is honoured) override
//! the file.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::processing::caption::{CaptionConfig, RetryPolicy};
use crate::processing::output::OUTPUT_FILE_NAME;
use crate::utils::{DescriberError, DescriberResult};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "describer.toml";

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn default_history_dir() -> String {
    "processing_history".to_string()
}

fn default_output_file_name() -> String {
    OUTPUT_FILE_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriberConfig {
    #[serde(default)]
    pub caption: CaptionConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Directory for per-session log files
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    /// Directory for the progress store and registry
    #[serde(default = "default_history_dir")]
    pub history_dir: String,
    /// Name of the CSV written into each image directory
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
}

impl Default for DescriberConfig {
    fn default() -> Self {
        Self {
            caption: CaptionConfig::default(),
            retry: RetryPolicy::default(),
            logs_dir: default_logs_dir(),
            history_dir: default_history_dir(),
            output_file_name: default_output_file_name(),
        }
    }
}

impl DescriberConfig {
    /// Loads `describer.toml` from `base_dir` if present, then applies
    /// environment overrides.
    pub fn load(base_dir: &Path) -> DescriberResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let file = base_dir.join(CONFIG_FILE_NAME);
        let mut config = if file.exists() {
            let text = std::fs::read_to_string(&file).map_err(|e| DescriberError::io(&file, e))?;
            let config = Self::from_toml(&text)?;
            info!("Loaded configuration from {}", file.display());
            config
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> DescriberResult<Self> {
        toml::from_str(text).map_err(|e| DescriberError::config(format!("{}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Applies `DESCRIBER_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> DescriberResult<()> {
        if let Some(endpoint) = lookup("DESCRIBER_ENDPOINT") {
            self.caption.endpoint = endpoint;
        }
        if let Some(model) = lookup("DESCRIBER_MODEL") {
            self.caption.model = model;
        }
        if let Some(prompt) = lookup("DESCRIBER_PROMPT") {
            self.caption.prompt = prompt;
        }
        if let Some(secs) = lookup("DESCRIBER_TIMEOUT_SECS") {
            self.caption.timeout_secs = secs
                .parse()
                .map_err(|_| DescriberError::config(format!("DESCRIBER_TIMEOUT_SECS is not a number: {}", secs)))?;
        }
        if let Some(attempts) = lookup("DESCRIBER_MAX_ATTEMPTS") {
            self.retry.max_attempts = attempts
                .parse()
                .map_err(|_| DescriberError::config(format!("DESCRIBER_MAX_ATTEMPTS is not a number: {}", attempts)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> DescriberResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(DescriberError::config("retry.max_attempts must be at least 1"));
        }
        if self.caption.timeout_secs == 0 {
            return Err(DescriberError::config("caption.timeout_secs must be at least 1"));
        }
        if self.retry.multiplier < 1.0 {
            return Err(DescriberError::config("retry.multiplier must be at least 1.0"));
        }
        if self.output_file_name.is_empty() || self.output_file_name.contains(['/', '\\']) {
            return Err(DescriberError::config("output_file_name must be a plain file name"));
        }
        Ok(())
    }
}
