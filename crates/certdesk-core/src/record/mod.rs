//! Immutable service-event record model.
//!
//! This module defines the data types for one completed front-desk service
//! event:
//! - [`ServiceRecord`]: one immutable, validated service-event entry
//! - [`IssuanceOutcome`]: the issued / not-issued root branch
//! - [`Recipient`] and [`OtherRecipient`]: who an issued certificate went to
//! - [`NonIssuanceReason`]: why a certificate was not issued
//! - Validated newtypes: [`RecordId`], [`RecipientName`], [`DifficultyNote`],
//!   [`NextDayCount`]
//!
//! Illegal states are unrepresentable: branch-specific fields only exist on
//! the variant that requires them, and the string/number newtypes can only be
//! built through smart constructors that return [`FieldError`] on invalid
//! input. A `ServiceRecord` therefore never needs re-validation after
//! construction, and the aggregation layer has no error path.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length in characters for an other-recipient name.
pub const MAX_RECIPIENT_NAME_LEN: usize = 120;

/// Maximum length in characters for a difficulty note.
pub const MAX_DIFFICULTY_NOTE_LEN: usize = 2000;

/// Errors produced by the validated field constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A required name was empty after trimming.
    #[error("recipient name is empty")]
    EmptyName,

    /// A recipient name exceeded [`MAX_RECIPIENT_NAME_LEN`].
    #[error("recipient name length {len} exceeds maximum {max}")]
    NameTooLong {
        /// The trimmed length that was provided.
        len: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// A required difficulty note was empty after trimming.
    #[error("difficulty note is empty")]
    EmptyNote,

    /// A difficulty note exceeded [`MAX_DIFFICULTY_NOTE_LEN`].
    #[error("difficulty note length {len} exceeds maximum {max}")]
    NoteTooLong {
        /// The trimmed length that was provided.
        len: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// A next-day count of zero was provided.
    #[error("next-day count must be greater than zero")]
    ZeroCount,
}

/// Unique identifier for a [`ServiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Mints a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who an issued certificate went to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    /// An indicating partner.
    Partner,
    /// Internal staff issuance.
    Internal,
    /// Someone else; requires a name and a classification.
    Other(OtherRecipient),
}

impl Recipient {
    /// Returns the stable machine token for this recipient category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Partner => "PARTNER",
            Self::Internal => "INTERNAL",
            Self::Other(_) => "OTHER",
        }
    }

    /// Returns the human-readable category label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Partner => "Partner",
            Self::Internal => "Internal",
            Self::Other(_) => "Other",
        }
    }
}

/// Details for a certificate issued to an "other" recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherRecipient {
    /// The recipient's name, non-empty and trimmed.
    pub name: RecipientName,
    /// Why the issuance went outside the usual channels.
    pub kind: OtherKind,
}

/// Classification of an "other" issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherKind {
    /// The usual issuing source was unavailable.
    SourceUnavailable,
    /// Internal issuance handled at the desk.
    InternalIssuance,
    /// Issued directly to the end client.
    EndClient,
}

impl OtherKind {
    /// Returns the stable machine token for this classification.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "SOURCE_UNAVAILABLE",
            Self::InternalIssuance => "INTERNAL_ISSUANCE",
            Self::EndClient => "END_CLIENT",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "Source unavailable",
            Self::InternalIssuance => "Internal issuance",
            Self::EndClient => "End client",
        }
    }
}

/// Why a certificate was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonIssuanceReason {
    /// The client withdrew before issuance.
    Withdrawal,
    /// Biometric verification failed to match.
    BiometricMismatch,
}

impl NonIssuanceReason {
    /// Returns the stable machine token for this reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Withdrawal => "WITHDRAWAL",
            Self::BiometricMismatch => "BIOMETRIC_MISMATCH",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Withdrawal => "Withdrawal",
            Self::BiometricMismatch => "Biometric mismatch",
        }
    }
}

/// The root branch of a service event: issued or not issued.
///
/// Exactly one branch is populated per record, and each branch carries only
/// the fields it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssuanceOutcome {
    /// A certificate was issued.
    Issued {
        /// Who the certificate was issued to.
        recipient: Recipient,
    },
    /// No certificate was issued.
    NotIssued {
        /// Why the issuance did not happen.
        reason: NonIssuanceReason,
    },
}

impl IssuanceOutcome {
    /// Returns `true` if this outcome is an issuance.
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        matches!(self, Self::Issued { .. })
    }

    /// Returns the human-readable outcome label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Issued { .. } => "Issued",
            Self::NotIssued { .. } => "Not issued",
        }
    }
}

/// A validated, trimmed, non-empty recipient name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientName(String);

impl RecipientName {
    /// Parses a raw name: trims whitespace, rejects empty and over-long
    /// input.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::EmptyName`] if the trimmed input is empty, or
    /// [`FieldError::NameTooLong`] if it exceeds
    /// [`MAX_RECIPIENT_NAME_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::EmptyName);
        }
        let len = trimmed.chars().count();
        if len > MAX_RECIPIENT_NAME_LEN {
            return Err(FieldError::NameTooLong {
                len,
                max: MAX_RECIPIENT_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, trimmed, non-empty difficulty note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyNote(String);

impl DifficultyNote {
    /// Parses a raw note: trims whitespace, rejects empty and over-long
    /// input.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::EmptyNote`] if the trimmed input is empty, or
    /// [`FieldError::NoteTooLong`] if it exceeds
    /// [`MAX_DIFFICULTY_NOTE_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::EmptyNote);
        }
        let len = trimmed.chars().count();
        if len > MAX_DIFFICULTY_NOTE_LEN {
            return Err(FieldError::NoteTooLong {
                len,
                max: MAX_DIFFICULTY_NOTE_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the note as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DifficultyNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A positive count of issuances queued for the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NextDayCount(u32);

impl NextDayCount {
    /// Creates a next-day count.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::ZeroCount`] if `count` is zero.
    pub const fn new(count: u32) -> Result<Self, FieldError> {
        if count == 0 {
            return Err(FieldError::ZeroCount);
        }
        Ok(Self(count))
    }

    /// Returns the count value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One completed service-event entry.
///
/// Records are immutable: there are no mutating accessors, and the session
/// ledger never rewrites or removes an appended record. Construction happens
/// through the intake decision tree, which guarantees that every field
/// required by the active branch is present and valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    id: RecordId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: IssuanceOutcome,
    difficulty: Option<DifficultyNote>,
    next_day: Option<NextDayCount>,
}

impl ServiceRecord {
    /// Creates a record with a fresh id and the current timestamp.
    ///
    /// The component types are already validated, so there is no error path
    /// here.
    #[must_use]
    pub fn new(
        outcome: IssuanceOutcome,
        difficulty: Option<DifficultyNote>,
        next_day: Option<NextDayCount>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            created_at: Utc::now(),
            outcome,
            difficulty,
            next_day,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the issued / not-issued branch.
    #[must_use]
    pub const fn outcome(&self) -> &IssuanceOutcome {
        &self.outcome
    }

    /// Returns `true` if a certificate was issued.
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        self.outcome.is_issued()
    }

    /// Returns the difficulty note, if difficulties were reported.
    #[must_use]
    pub fn difficulty_note(&self) -> Option<&DifficultyNote> {
        self.difficulty.as_ref()
    }

    /// Returns the next-day count, if issuances are queued for tomorrow.
    #[must_use]
    pub const fn next_day_count(&self) -> Option<NextDayCount> {
        self.next_day
    }

    /// Returns the list-row detail label for this record.
    ///
    /// Issued records show the recipient category, or
    /// `"{name} ({kind})"` for the other-recipient case; non-issued records
    /// show the reason label.
    #[must_use]
    pub fn detail_label(&self) -> String {
        match &self.outcome {
            IssuanceOutcome::Issued {
                recipient: Recipient::Other(other),
            } => format!("{} ({})", other.name, other.kind.label()),
            IssuanceOutcome::Issued { recipient } => recipient.label().to_string(),
            IssuanceOutcome::NotIssued { reason } => reason.label().to_string(),
        }
    }
}
