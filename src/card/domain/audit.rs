//! Audit trail entries for card transitions.

use super::{CardDomainError, CardId, CardTransition};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Persisted audit record for one card revision.
///
/// Entries are keyed by `(card_id, revision)`. The fingerprint is the
/// SHA-256 of the transition's canonical JSON encoding, so a replayed
/// append can be told apart from a conflicting one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAuditEntry {
    transition: CardTransition,
    fingerprint: String,
}

impl CardAuditEntry {
    /// Builds the audit entry for a transition.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::AuditEncoding`] when the transition
    /// cannot be encoded.
    pub fn record(transition: CardTransition) -> Result<Self, CardDomainError> {
        let fingerprint = fingerprint(&transition)?;
        Ok(Self {
            transition,
            fingerprint,
        })
    }

    /// Reconstructs an entry from storage without recomputing its
    /// fingerprint.
    #[must_use]
    pub const fn from_persisted(transition: CardTransition, fingerprint: String) -> Self {
        Self {
            transition,
            fingerprint,
        }
    }

    /// Returns the card identifier.
    #[must_use]
    pub const fn card_id(&self) -> CardId {
        self.transition.card_id
    }

    /// Returns the revision this entry records.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.transition.revision
    }

    /// Returns the recorded transition.
    #[must_use]
    pub const fn transition(&self) -> &CardTransition {
        &self.transition
    }

    /// Returns the hex-encoded payload fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns `true` when `other` records the same transition.
    #[must_use]
    pub fn is_replay_of(&self, other: &Self) -> bool {
        self.card_id() == other.card_id()
            && self.revision() == other.revision()
            && self.fingerprint == other.fingerprint
    }

    /// Returns `true` when the stored fingerprint matches the payload.
    #[must_use]
    pub fn verify(&self) -> bool {
        fingerprint(&self.transition).is_ok_and(|computed| computed == self.fingerprint)
    }
}

fn fingerprint(transition: &CardTransition) -> Result<String, CardDomainError> {
    let payload = serde_json::to_vec(transition)
        .map_err(|err| CardDomainError::AuditEncoding(err.to_string()))?;
    let digest = Sha256::digest(&payload);
    let mut encoded = String::with_capacity(digest.len() * 2);
    for byte in digest {
        write!(encoded, "{byte:02x}")
            .map_err(|err| CardDomainError::AuditEncoding(err.to_string()))?;
    }
    Ok(encoded)
}
