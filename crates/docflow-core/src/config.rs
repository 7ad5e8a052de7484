//! Store configuration
//!
//! Loaded from TOML; every field has a default so partial files are fine:
//!
//! ```toml
//! archive_min_age_days = 90
//! max_attachment_bytes = 5242880
//!
//! [upload]
//! tick_ms = 100
//! ```

use crate::error::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default attachment ceiling (10 MiB)
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions accepted by the submission form
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "txt", "jpg", "jpeg", "png"];

/// Upper bound for `archive_min_age_days` (100 years)
pub const MAX_ARCHIVE_MIN_AGE_DAYS: u32 = 36_500;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Finalized documents older than this appear in the archive view
    pub archive_min_age_days: u32,
    /// Largest single attachment accepted by submit
    pub max_attachment_bytes: u64,
    /// Lower-case extensions accepted by submit
    pub allowed_extensions: Vec<String>,
    /// Upload progress simulation
    pub upload: UploadConfig,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With archive age threshold
    #[inline]
    #[must_use]
    pub fn with_archive_min_age_days(mut self, days: u32) -> Self {
        self.archive_min_age_days = days;
        self
    }

    /// With attachment size ceiling
    #[inline]
    #[must_use]
    pub fn with_max_attachment_bytes(mut self, bytes: u64) -> Self {
        self.max_attachment_bytes = bytes;
        self
    }

    /// With accepted extensions (normalized to lower case, no dot)
    #[must_use]
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// With upload simulation settings
    #[inline]
    #[must_use]
    pub fn with_upload(mut self, upload: UploadConfig) -> Self {
        self.upload = upload;
        self
    }

    /// Archive threshold as a duration
    #[inline]
    #[must_use]
    pub fn archive_min_age(&self) -> Duration {
        Duration::days(i64::from(self.archive_min_age_days))
    }

    /// Whether an extension (without dot) is accepted
    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive_min_age_days > MAX_ARCHIVE_MIN_AGE_DAYS {
            return Err(ConfigError::Invalid(format!(
                "archive_min_age_days must be at most {MAX_ARCHIVE_MIN_AGE_DAYS}"
            )));
        }
        if self.max_attachment_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_attachment_bytes must be positive".to_string(),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "allowed_extensions must not be empty".to_string(),
            ));
        }
        self.upload.validate()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            archive_min_age_days: 30,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            upload: UploadConfig::default(),
        }
    }
}

/// Upload progress simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Interval between progress ticks, in milliseconds
    pub tick_ms: u64,
    /// Largest progress step per tick, in percent
    pub max_step: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl UploadConfig {
    /// With tick interval
    #[inline]
    #[must_use]
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// With maximum step
    #[inline]
    #[must_use]
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    /// With RNG seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("upload.tick_ms must be positive".to_string()));
        }
        if !(self.max_step > 0.0 && self.max_step <= 100.0) {
            return Err(ConfigError::Invalid(
                "upload.max_step must be within (0, 100]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tick_ms: 300,
            max_step: 20.0,
            seed: None,
        }
    }
}
