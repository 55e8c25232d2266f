//! Business records tracked by cards, and card titles.

use super::{CardDomainError, ParseSubjectKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of business record a card follows up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// A booked shipment.
    Shipment,
    /// A request for quotation.
    Rfq,
    /// A quote issued against an RFQ.
    Quote,
    /// A customer or vendor invoice.
    Invoice,
    /// An AMS customs filing.
    AmsFiling,
    /// A SIS carrier booking.
    SisBooking,
}

impl SubjectKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipment => "shipment",
            Self::Rfq => "rfq",
            Self::Quote => "quote",
            Self::Invoice => "invoice",
            Self::AmsFiling => "ams_filing",
            Self::SisBooking => "sis_booking",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SubjectKind {
    type Error = ParseSubjectKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "shipment" => Ok(Self::Shipment),
            "rfq" => Ok(Self::Rfq),
            "quote" => Ok(Self::Quote),
            "invoice" => Ok(Self::Invoice),
            "ams_filing" => Ok(Self::AmsFiling),
            "sis_booking" => Ok(Self::SisBooking),
            _ => Err(ParseSubjectKindError(value.to_owned())),
        }
    }
}

/// Reference to the business record a card tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSubject {
    kind: SubjectKind,
    reference: String,
}

impl CardSubject {
    /// Creates a validated subject reference.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::EmptySubjectReference`] when the
    /// reference is blank.
    pub fn new(kind: SubjectKind, reference: impl Into<String>) -> Result<Self, CardDomainError> {
        let raw = reference.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CardDomainError::EmptySubjectReference);
        }
        Ok(Self {
            kind,
            reference: trimmed.to_owned(),
        })
    }

    /// Returns the subject kind.
    #[must_use]
    pub const fn kind(&self) -> SubjectKind {
        self.kind
    }

    /// Returns the record reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for CardSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.reference)
    }
}

/// Short human-readable description of the work a card asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardTitle(String);

impl CardTitle {
    const MAX_CHARS: usize = 200;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::EmptyTitle`] for blank input or
    /// [`CardDomainError::TitleTooLong`] past 200 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, CardDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CardDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(CardDomainError::TitleTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
