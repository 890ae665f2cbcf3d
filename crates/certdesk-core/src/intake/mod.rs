//! Intake decision-tree state machine.
//!
//! This module implements the guided questionnaire that produces one
//! immutable [`ServiceRecord`] per completed walk. The form holds a bag of
//! optional answers, applies typed [`AnswerEvent`]s from the render layer,
//! and validates the whole bag on submission.
//!
//! # State Machine
//!
//! ```text
//!  Unanswered ──certificate issued?──► RootAnswered
//!  RootAnswered ──recipient / reason──► BranchAnswered
//!  BranchAnswered ──other name+kind──► SubfieldsAnswered
//!  SubfieldsAnswered ──difficulties / next-day──► Complete
//! ```
//!
//! Any upstream answer change resets all downstream answers:
//! re-answering the root question clears both branches, picking a non-other
//! recipient clears the other-recipient fields, and answering "no" to the
//! difficulties or next-day questions clears their follow-up fields.
//!
//! Answer events for questions that are not currently visible (for example a
//! recipient choice while the root question says "not issued") are ignored;
//! the render layer only shows visible questions, so such events can only
//! come from a stale view.
//!
//! # Submit Modes
//!
//! [`SubmitMode::Explicit`] commits only through [`IntakeForm::submit`].
//! [`SubmitMode::OnCompletion`] commits as soon as an applied answer leaves
//! the form complete. Both modes run the identical validation; they differ
//! only in trigger.
//!
//! Validation checks preconditions in a fixed order and reports the first
//! failure as a single-cause [`ValidationError`]; no partial record is ever
//! produced, and a rejected submission keeps the form's answers so the
//! operator can correct the offending field and resubmit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{
    DifficultyNote, FieldError, IssuanceOutcome, NextDayCount, NonIssuanceReason, OtherKind,
    OtherRecipient, Recipient, RecipientName, ServiceRecord,
};

#[cfg(test)]
mod tests;

/// When the intake form commits a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Commit only on an explicit [`IntakeForm::submit`] call.
    #[default]
    Explicit,
    /// Commit immediately on the answer event that completes the form.
    OnCompletion,
}

impl SubmitMode {
    /// Returns the stable machine token for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "EXPLICIT",
            Self::OnCompletion => "ON_COMPLETION",
        }
    }
}

/// A recipient category choice, before the other-recipient details exist.
///
/// The form tracks the choice separately from [`Recipient`] because the
/// `Other` category needs two more answers before a `Recipient` can be
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientChoice {
    /// An indicating partner.
    Partner,
    /// Internal staff issuance.
    Internal,
    /// Someone else; name and kind follow.
    Other,
}

impl RecipientChoice {
    /// Returns the stable machine token for this choice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Partner => "PARTNER",
            Self::Internal => "INTERNAL",
            Self::Other => "OTHER",
        }
    }
}

/// One answer arriving from the render layer.
///
/// Free-text answers arrive as whole values (the render layer sends the
/// field content, not keystrokes), so in auto-submit mode a text answer can
/// complete the form like any selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "answer", content = "value", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// Root question: was a certificate issued?
    CertificateIssued(bool),
    /// Issued branch: who was it issued to?
    Recipient(RecipientChoice),
    /// Other-recipient sub-field: the recipient's name.
    OtherName(String),
    /// Other-recipient sub-field: the issuance classification.
    OtherKind(OtherKind),
    /// Not-issued branch: why was it not issued?
    NonIssuanceReason(NonIssuanceReason),
    /// Common question: were there difficulties?
    HadDifficulties(bool),
    /// Difficulty follow-up: the free-text note.
    DifficultyNote(String),
    /// Common question: are issuances queued for the next day?
    NextDayIssuance(bool),
    /// Next-day follow-up: how many.
    NextDayCount(u32),
}

/// Errors returned when a submission fails validation.
///
/// Exactly one cause is reported per failed submission: the checks run in
/// the order listed here and the first unmet precondition wins. The
/// `Display` form is the diagnostic message; [`ValidationError::user_message`]
/// is the operator-facing sentence for the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One of the three root questions is unanswered.
    #[error("root questions unanswered")]
    RootUnanswered,

    /// Issued, but no recipient selected.
    #[error("recipient not selected for issued certificate")]
    MissingRecipient,

    /// Recipient is "other", but the name is missing or blank.
    #[error("other-recipient name missing")]
    MissingOtherName,

    /// Recipient is "other", but no classification selected.
    #[error("other-recipient kind not selected")]
    MissingOtherKind,

    /// Not issued, but no reason selected.
    #[error("non-issuance reason not selected")]
    MissingNonIssuanceReason,

    /// Difficulties reported, but the note is missing or blank.
    #[error("difficulty note missing")]
    MissingDifficultyNote,

    /// Next-day issuance reported, but the count is missing or zero.
    #[error("next-day count missing or zero")]
    MissingNextDayCount,

    /// A field was present but failed its bound check.
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl ValidationError {
    /// Returns the operator-facing message for this failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::RootUnanswered => "Fill in all required fields",
            Self::MissingRecipient => "Select who it was issued to",
            Self::MissingOtherName => "Enter the name for the 'Other' issuance",
            Self::MissingOtherKind => "Select the type for the 'Other' issuance",
            Self::MissingNonIssuanceReason => "Select the reason it was not issued",
            Self::MissingDifficultyNote => "Describe the difficulties",
            Self::MissingNextDayCount => "Enter a quantity for the next day",
            Self::Field(FieldError::NameTooLong { .. }) => "Shorten the recipient name",
            Self::Field(FieldError::NoteTooLong { .. }) => "Shorten the difficulty note",
            Self::Field(_) => "Fill in all required fields",
        }
    }
}

/// Conceptual position in the decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    /// The root question is unanswered.
    Unanswered,
    /// The root question is answered; its branch question is not.
    RootAnswered,
    /// The branch question is answered; required sub-fields are not.
    BranchAnswered,
    /// Branch and sub-fields are done; common questions remain.
    SubfieldsAnswered,
    /// Every required answer is present and valid.
    Complete,
}

/// Snapshot of the form for the render collaborator.
///
/// Visibility flags describe which question blocks are currently
/// answerable, so the render layer can draw the branching form without
/// duplicating tree logic. Held answers are echoed back verbatim
/// (untrimmed), matching what the operator typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeView {
    /// Current conceptual stage.
    pub stage: IntakeStage,
    /// Root answer, if given.
    pub certificate_issued: Option<bool>,
    /// Whether the recipient block is visible.
    pub show_recipient: bool,
    /// Recipient choice, if given.
    pub recipient: Option<RecipientChoice>,
    /// Whether the other-recipient block is visible.
    pub show_other_details: bool,
    /// Raw other-recipient name as typed.
    pub other_name: String,
    /// Other-recipient classification, if given.
    pub other_kind: Option<OtherKind>,
    /// Whether the non-issuance reason block is visible.
    pub show_non_issuance_reason: bool,
    /// Non-issuance reason, if given.
    pub non_issuance_reason: Option<NonIssuanceReason>,
    /// Difficulties answer, if given.
    pub had_difficulties: Option<bool>,
    /// Whether the difficulty note field is visible.
    pub show_difficulty_note: bool,
    /// Raw difficulty note as typed.
    pub difficulty_note: String,
    /// Next-day answer, if given.
    pub next_day_issuance: Option<bool>,
    /// Whether the next-day count field is visible.
    pub show_next_day_count: bool,
    /// Next-day count, if given.
    pub next_day_count: Option<u32>,
}

/// The bag of optional answers currently held by the form.
#[derive(Debug, Clone, Default, PartialEq)]
struct Answers {
    certificate_issued: Option<bool>,
    recipient: Option<RecipientChoice>,
    other_name: String,
    other_kind: Option<OtherKind>,
    non_issuance_reason: Option<NonIssuanceReason>,
    had_difficulties: Option<bool>,
    difficulty_note: String,
    next_day_issuance: Option<bool>,
    next_day_count: Option<u32>,
}

/// The intake decision-tree form.
///
/// Owns the transient answer state for one in-progress walk. A completed
/// walk yields exactly one [`ServiceRecord`] and resets the form to its
/// empty state; an abandoned walk simply discards the answers.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    answers: Answers,
    mode: SubmitMode,
}

impl IntakeForm {
    /// Creates an empty form with the given submit mode.
    #[must_use]
    pub fn new(mode: SubmitMode) -> Self {
        Self {
            answers: Answers::default(),
            mode,
        }
    }

    /// Returns the configured submit mode.
    #[must_use]
    pub const fn mode(&self) -> SubmitMode {
        self.mode
    }

    /// Applies one answer event.
    ///
    /// Downstream answers of a changed upstream question are cleared, per
    /// the reset cascade in the module docs. In
    /// [`SubmitMode::OnCompletion`], an event that leaves the form complete
    /// commits immediately: the built record is returned and the form
    /// resets. In [`SubmitMode::Explicit`] this always returns `None`.
    pub fn apply(&mut self, event: AnswerEvent) -> Option<ServiceRecord> {
        tracing::debug!(target: "certdesk::intake", ?event, "applying answer");
        match event {
            AnswerEvent::CertificateIssued(issued) => self.answer_root(issued),
            AnswerEvent::Recipient(choice) => self.answer_recipient(choice),
            AnswerEvent::OtherName(name) => self.answer_other_name(name),
            AnswerEvent::OtherKind(kind) => self.answer_other_kind(kind),
            AnswerEvent::NonIssuanceReason(reason) => self.answer_reason(reason),
            AnswerEvent::HadDifficulties(had) => self.answer_difficulties(had),
            AnswerEvent::DifficultyNote(note) => self.answer_note(note),
            AnswerEvent::NextDayIssuance(next) => self.answer_next_day(next),
            AnswerEvent::NextDayCount(count) => self.answer_count(count),
        }

        if self.mode == SubmitMode::OnCompletion {
            if let Ok(parts) = self.validate() {
                let record = parts.into_record();
                tracing::debug!(
                    target: "certdesk::intake",
                    record_id = %record.id(),
                    "form complete, auto-committing"
                );
                self.reset();
                return Some(record);
            }
        }
        None
    }

    /// Validates the current answers and, on success, builds the record and
    /// resets the form.
    ///
    /// # Errors
    ///
    /// Returns the first unmet precondition as a [`ValidationError`]; the
    /// answers are kept so the operator can correct and resubmit.
    pub fn submit(&mut self) -> Result<ServiceRecord, ValidationError> {
        match self.validate() {
            Ok(parts) => {
                self.reset();
                Ok(parts.into_record())
            },
            Err(err) => {
                tracing::warn!(target: "certdesk::intake", error = %err, "submission rejected");
                Err(err)
            },
        }
    }

    /// Discards all in-progress answers.
    pub fn reset(&mut self) {
        tracing::debug!(target: "certdesk::intake", "resetting intake form");
        self.answers = Answers::default();
    }

    /// Returns `true` if no question has been answered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers == Answers::default()
    }

    /// Returns a render-ready snapshot of the form.
    #[must_use]
    pub fn view(&self) -> IntakeView {
        let a = &self.answers;
        IntakeView {
            stage: self.stage(),
            certificate_issued: a.certificate_issued,
            show_recipient: a.certificate_issued == Some(true),
            recipient: a.recipient,
            show_other_details: a.certificate_issued == Some(true)
                && a.recipient == Some(RecipientChoice::Other),
            other_name: a.other_name.clone(),
            other_kind: a.other_kind,
            show_non_issuance_reason: a.certificate_issued == Some(false),
            non_issuance_reason: a.non_issuance_reason,
            had_difficulties: a.had_difficulties,
            show_difficulty_note: a.had_difficulties == Some(true),
            difficulty_note: a.difficulty_note.clone(),
            next_day_issuance: a.next_day_issuance,
            show_next_day_count: a.next_day_issuance == Some(true),
            next_day_count: a.next_day_count,
        }
    }

    /// Returns the form's conceptual position in the decision tree.
    #[must_use]
    pub fn stage(&self) -> IntakeStage {
        let a = &self.answers;
        let Some(issued) = a.certificate_issued else {
            return IntakeStage::Unanswered;
        };
        let branch_answered = if issued {
            a.recipient.is_some()
        } else {
            a.non_issuance_reason.is_some()
        };
        if !branch_answered {
            return IntakeStage::RootAnswered;
        }
        let subfields_done = a.recipient != Some(RecipientChoice::Other)
            || (!a.other_name.trim().is_empty() && a.other_kind.is_some());
        if !subfields_done {
            return IntakeStage::BranchAnswered;
        }
        if self.validate().is_ok() {
            IntakeStage::Complete
        } else {
            IntakeStage::SubfieldsAnswered
        }
    }

    fn answer_root(&mut self, issued: bool) {
        let a = &mut self.answers;
        a.certificate_issued = Some(issued);
        // Both branches reset on any root re-answer.
        a.recipient = None;
        a.other_name.clear();
        a.other_kind = None;
        a.non_issuance_reason = None;
    }

    fn answer_recipient(&mut self, choice: RecipientChoice) {
        let a = &mut self.answers;
        if a.certificate_issued != Some(true) {
            tracing::debug!(target: "certdesk::intake", "ignoring recipient answer: not issued");
            return;
        }
        a.recipient = Some(choice);
        if choice != RecipientChoice::Other {
            a.other_name.clear();
            a.other_kind = None;
        }
    }

    fn answer_other_name(&mut self, name: String) {
        let a = &mut self.answers;
        if a.recipient != Some(RecipientChoice::Other) {
            tracing::debug!(target: "certdesk::intake", "ignoring other-name answer: not other");
            return;
        }
        a.other_name = name;
    }

    fn answer_other_kind(&mut self, kind: OtherKind) {
        let a = &mut self.answers;
        if a.recipient != Some(RecipientChoice::Other) {
            tracing::debug!(target: "certdesk::intake", "ignoring other-kind answer: not other");
            return;
        }
        a.other_kind = Some(kind);
    }

    fn answer_reason(&mut self, reason: NonIssuanceReason) {
        let a = &mut self.answers;
        if a.certificate_issued != Some(false) {
            tracing::debug!(target: "certdesk::intake", "ignoring reason answer: issued");
            return;
        }
        a.non_issuance_reason = Some(reason);
    }

    fn answer_difficulties(&mut self, had: bool) {
        let a = &mut self.answers;
        a.had_difficulties = Some(had);
        if !had {
            a.difficulty_note.clear();
        }
    }

    fn answer_note(&mut self, note: String) {
        let a = &mut self.answers;
        if a.had_difficulties != Some(true) {
            tracing::debug!(target: "certdesk::intake", "ignoring note answer: no difficulties");
            return;
        }
        a.difficulty_note = note;
    }

    fn answer_next_day(&mut self, next: bool) {
        let a = &mut self.answers;
        a.next_day_issuance = Some(next);
        if !next {
            a.next_day_count = None;
        }
    }

    fn answer_count(&mut self, count: u32) {
        let a = &mut self.answers;
        if a.next_day_issuance != Some(true) {
            tracing::debug!(target: "certdesk::intake", "ignoring count answer: no next-day");
            return;
        }
        a.next_day_count = Some(count);
    }

    /// Validates the answer bag without resetting or minting a record.
    ///
    /// Precondition order: root questions, recipient, other-recipient
    /// sub-fields (name then kind), non-issuance reason, difficulty note,
    /// next-day count. The first failure wins.
    fn validate(&self) -> Result<RecordParts, ValidationError> {
        let a = &self.answers;
        let (Some(issued), Some(had_difficulties), Some(next_day)) = (
            a.certificate_issued,
            a.had_difficulties,
            a.next_day_issuance,
        ) else {
            return Err(ValidationError::RootUnanswered);
        };

        let outcome = if issued {
            let choice = a.recipient.ok_or(ValidationError::MissingRecipient)?;
            let recipient = match choice {
                RecipientChoice::Partner => Recipient::Partner,
                RecipientChoice::Internal => Recipient::Internal,
                RecipientChoice::Other => {
                    let name = match RecipientName::parse(&a.other_name) {
                        Ok(name) => name,
                        Err(FieldError::EmptyName) => {
                            return Err(ValidationError::MissingOtherName);
                        },
                        Err(err) => return Err(ValidationError::Field(err)),
                    };
                    let kind = a.other_kind.ok_or(ValidationError::MissingOtherKind)?;
                    Recipient::Other(OtherRecipient { name, kind })
                },
            };
            IssuanceOutcome::Issued { recipient }
        } else {
            let reason = a
                .non_issuance_reason
                .ok_or(ValidationError::MissingNonIssuanceReason)?;
            IssuanceOutcome::NotIssued { reason }
        };

        let difficulty = if had_difficulties {
            match DifficultyNote::parse(&a.difficulty_note) {
                Ok(note) => Some(note),
                Err(FieldError::EmptyNote) => {
                    return Err(ValidationError::MissingDifficultyNote);
                },
                Err(err) => return Err(ValidationError::Field(err)),
            }
        } else {
            None
        };

        let next_day_count = if next_day {
            let count = a
                .next_day_count
                .ok_or(ValidationError::MissingNextDayCount)?;
            match NextDayCount::new(count) {
                Ok(count) => Some(count),
                Err(FieldError::ZeroCount) => {
                    return Err(ValidationError::MissingNextDayCount);
                },
                Err(err) => return Err(ValidationError::Field(err)),
            }
        } else {
            None
        };

        Ok(RecordParts {
            outcome,
            difficulty,
            next_day_count,
        })
    }
}

/// Validated components of a record, ready to be minted.
#[derive(Debug)]
struct RecordParts {
    outcome: IssuanceOutcome,
    difficulty: Option<DifficultyNote>,
    next_day_count: Option<NextDayCount>,
}

impl RecordParts {
    /// Mints the record with a fresh id and the current timestamp.
    fn into_record(self) -> ServiceRecord {
        ServiceRecord::new(self.outcome, self.difficulty, self.next_day_count)
    }
}
