//! Configuration sections and their conversion to domain policies.

use super::ConfigError;
use crate::card::domain::EscalationPolicy;
use crate::shipment::domain::LockPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL; required after environment overrides.
    pub url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 8,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no URL is configured.
    pub fn require_url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::Invalid("database.url is required".to_owned()))
    }
}

/// Card deadline thresholds applied to cards opened without their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EscalationConfig {
    /// Minutes from assignment until the warning fires.
    pub warning_after_minutes: u32,
    /// Minutes from assignment until the card breaches.
    pub breach_after_minutes: u32,
    /// Minutes between escalations of a breached card.
    pub re_escalate_after_minutes: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            warning_after_minutes: 240,
            breach_after_minutes: 480,
            re_escalate_after_minutes: 240,
        }
    }
}

impl EscalationConfig {
    /// Converts the thresholds into an [`EscalationPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero or misordered thresholds.
    pub fn policy(&self) -> Result<EscalationPolicy, ConfigError> {
        EscalationPolicy::from_minutes(
            self.warning_after_minutes,
            self.breach_after_minutes,
            self.re_escalate_after_minutes,
        )
        .map_err(|err| ConfigError::Invalid(format!("escalation: {err}")))
    }
}

/// Shipment lock timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShipmentLockConfig {
    /// Hours after ETD until a shipment locks.
    pub lock_after_hours: u32,
}

impl Default for ShipmentLockConfig {
    fn default() -> Self {
        Self {
            lock_after_hours: 72,
        }
    }
}

impl ShipmentLockConfig {
    /// Converts the offset into a [`LockPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero offset.
    pub fn policy(&self) -> Result<LockPolicy, ConfigError> {
        LockPolicy::from_hours(self.lock_after_hours)
            .map_err(|err| ConfigError::Invalid(format!("shipment_lock: {err}")))
    }
}

/// Scheduled job intervals and batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsConfig {
    /// Seconds between card ticks.
    pub card_tick_secs: u64,
    /// Seconds between shipment lock passes.
    pub shipment_lock_secs: u64,
    /// Maximum records handled per run.
    pub batch_size: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            card_tick_secs: 60,
            shipment_lock_secs: 300,
            batch_size: 200,
        }
    }
}

impl JobsConfig {
    /// Returns the card tick period.
    #[must_use]
    pub const fn card_tick_period(&self) -> Duration {
        Duration::from_secs(self.card_tick_secs)
    }

    /// Returns the shipment lock period.
    #[must_use]
    pub const fn shipment_lock_period(&self) -> Duration {
        Duration::from_secs(self.shipment_lock_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.card_tick_secs == 0 {
            return Err(ConfigError::Invalid("jobs.card_tick_secs must be positive".to_owned()));
        }
        if self.shipment_lock_secs == 0 {
            return Err(ConfigError::Invalid(
                "jobs.shipment_lock_secs must be positive".to_owned(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("jobs.batch_size must be positive".to_owned()));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Card escalation thresholds.
    pub escalation: EscalationConfig,
    /// Shipment lock timing.
    pub shipment_lock: ShipmentLockConfig,
    /// Job scheduling.
    pub jobs: JobsConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Checks every section, including the required database URL.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.require_url()?;
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "database.pool_size must be positive".to_owned(),
            ));
        }
        self.escalation.policy()?;
        self.shipment_lock.policy()?;
        self.jobs.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".to_owned()));
        }
        Ok(())
    }
}
