//! Escalation thresholds and the deadlines derived from them.

use super::CardDomainError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Thresholds, relative to an anchor time, that drive a card through its
/// warning, breach, and escalation deadlines.
///
/// Durations are held in whole seconds so the policy can be stored next to
/// the card it governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    warning_after_secs: i64,
    breach_after_secs: i64,
    re_escalate_after_secs: i64,
}

impl EscalationPolicy {
    /// Creates a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::NonPositiveDuration`] when any duration is
    /// not strictly positive and [`CardDomainError::WarningNotBeforeBreach`]
    /// when the warning threshold is not earlier than the breach threshold.
    pub fn new(
        warning_after: TimeDelta,
        breach_after: TimeDelta,
        re_escalate_after: TimeDelta,
    ) -> Result<Self, CardDomainError> {
        Self::from_secs(
            warning_after.num_seconds(),
            breach_after.num_seconds(),
            re_escalate_after.num_seconds(),
        )
    }

    /// Creates a validated policy from minute counts.
    ///
    /// # Errors
    ///
    /// Same as [`EscalationPolicy::new`].
    pub fn from_minutes(
        warning_after: u32,
        breach_after: u32,
        re_escalate_after: u32,
    ) -> Result<Self, CardDomainError> {
        Self::from_secs(
            i64::from(warning_after) * 60,
            i64::from(breach_after) * 60,
            i64::from(re_escalate_after) * 60,
        )
    }

    /// Creates a validated policy from second counts, as persisted.
    ///
    /// # Errors
    ///
    /// Same as [`EscalationPolicy::new`].
    pub fn from_secs(
        warning_after_secs: i64,
        breach_after_secs: i64,
        re_escalate_after_secs: i64,
    ) -> Result<Self, CardDomainError> {
        for (field, value) in [
            ("warning_after", warning_after_secs),
            ("breach_after", breach_after_secs),
            ("re_escalate_after", re_escalate_after_secs),
        ] {
            if value <= 0 {
                return Err(CardDomainError::NonPositiveDuration(field));
            }
        }
        if warning_after_secs >= breach_after_secs {
            return Err(CardDomainError::WarningNotBeforeBreach);
        }
        Ok(Self {
            warning_after_secs,
            breach_after_secs,
            re_escalate_after_secs,
        })
    }

    /// Returns the warning threshold in seconds.
    #[must_use]
    pub const fn warning_after_secs(&self) -> i64 {
        self.warning_after_secs
    }

    /// Returns the breach threshold in seconds.
    #[must_use]
    pub const fn breach_after_secs(&self) -> i64 {
        self.breach_after_secs
    }

    /// Returns the re-escalation interval in seconds.
    #[must_use]
    pub const fn re_escalate_after_secs(&self) -> i64 {
        self.re_escalate_after_secs
    }

    /// Computes fresh warning and breach deadlines from `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::DeadlineOutOfRange`] when a deadline
    /// overflows the timestamp range.
    pub fn deadlines_from(&self, anchor: DateTime<Utc>) -> Result<CardDeadlines, CardDomainError> {
        let warning_at = offset(anchor, self.warning_after_secs)?;
        let breach_at = offset(anchor, self.breach_after_secs)?;
        CardDeadlines::new(warning_at, breach_at)
    }

    /// Computes the next re-escalation deadline from `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::DeadlineOutOfRange`] on overflow.
    pub fn next_escalation_from(
        &self,
        anchor: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CardDomainError> {
        offset(anchor, self.re_escalate_after_secs)
    }
}

fn offset(anchor: DateTime<Utc>, secs: i64) -> Result<DateTime<Utc>, CardDomainError> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or(CardDomainError::DeadlineOutOfRange)
}

/// Concrete deadlines armed on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeadlines {
    warning_at: DateTime<Utc>,
    breach_at: DateTime<Utc>,
    next_escalation_at: Option<DateTime<Utc>>,
}

impl CardDeadlines {
    /// Creates deadlines with no pending re-escalation.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::WarningNotBeforeBreach`] unless
    /// `warning_at < breach_at`.
    pub fn new(
        warning_at: DateTime<Utc>,
        breach_at: DateTime<Utc>,
    ) -> Result<Self, CardDomainError> {
        if warning_at >= breach_at {
            return Err(CardDomainError::WarningNotBeforeBreach);
        }
        Ok(Self {
            warning_at,
            breach_at,
            next_escalation_at: None,
        })
    }

    /// Returns a copy with the re-escalation deadline replaced.
    #[must_use]
    pub const fn with_next_escalation_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.next_escalation_at = at;
        self
    }

    /// Returns the warning deadline.
    #[must_use]
    pub const fn warning_at(&self) -> DateTime<Utc> {
        self.warning_at
    }

    /// Returns the breach deadline.
    #[must_use]
    pub const fn breach_at(&self) -> DateTime<Utc> {
        self.breach_at
    }

    /// Returns the pending re-escalation deadline, if any.
    #[must_use]
    pub const fn next_escalation_at(&self) -> Option<DateTime<Utc>> {
        self.next_escalation_at
    }
}
