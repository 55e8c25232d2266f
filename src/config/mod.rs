//! Typed application configuration.
//!
//! Settings live in `freightdesk.toml` inside a configuration directory,
//! read through a `cap-std` directory capability. A missing file means all
//! defaults. `FREIGHTDESK_DATABASE_URL` and `FREIGHTDESK_LOG_LEVEL` override
//! the file.

mod sections;

pub use sections::{
    AppConfig, DatabaseConfig, EscalationConfig, JobsConfig, LogFormat, LoggingConfig,
    ShipmentLockConfig,
};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use thiserror::Error;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE: &str = "freightdesk.toml";

/// Environment variable overriding `database.url`.
pub const DATABASE_URL_VAR: &str = "FREIGHTDESK_DATABASE_URL";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_VAR: &str = "FREIGHTDESK_LOG_LEVEL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration directory or file could not be read.
    #[error("failed to read configuration from '{path}': {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not valid TOML for [`AppConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range or missing.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies environment overrides fetched through `lookup`.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            self.database.url = Some(url);
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            self.logging.level = level;
        }
        self
    }

    /// Loads, overrides and validates configuration from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the directory cannot be opened, the file
    /// cannot be read or parsed, or validation fails.
    pub fn load(config_dir: &Utf8Path) -> Result<Self, ConfigError> {
        Self::load_with(config_dir, |name| std::env::var(name).ok())
    }

    /// Like [`AppConfig::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_with(
        config_dir: &Utf8Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: config_dir.join(CONFIG_FILE).into_string(),
            source,
        };
        let dir = Dir::open_ambient_dir(config_dir, ambient_authority()).map_err(read_error)?;
        let contents = match dir.read_to_string(CONFIG_FILE) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(read_error(err)),
        };

        let config = Self::from_toml_str(&contents)?.with_overrides(lookup);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
