//! State-machine and property tests for the intake decision tree.
//!
//! These tests verify:
//! - Validation order: the first unmet precondition wins
//! - Reset cascades: upstream re-answers clear downstream answers
//! - Submit modes: explicit never auto-commits, auto commits on completion
//! - Rejected submissions keep the form's answers intact

#![allow(clippy::items_after_statements)]

use proptest::prelude::*;

use super::{
    AnswerEvent, IntakeForm, IntakeStage, RecipientChoice, SubmitMode, ValidationError,
};
use crate::record::{IssuanceOutcome, NonIssuanceReason, OtherKind, Recipient};

// ============================================================================
// Test Helpers
// ============================================================================

/// Answers the full issued-to-partner walk without submitting.
fn answer_partner_walk(form: &mut IntakeForm) {
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Partner));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
}

/// Answers the full not-issued walk with both follow-ups.
fn answer_withdrawal_walk(form: &mut IntakeForm) {
    form.apply(AnswerEvent::CertificateIssued(false));
    form.apply(AnswerEvent::NonIssuanceReason(NonIssuanceReason::Withdrawal));
    form.apply(AnswerEvent::HadDifficulties(true));
    form.apply(AnswerEvent::DifficultyNote("system outage".to_string()));
    form.apply(AnswerEvent::NextDayIssuance(true));
    form.apply(AnswerEvent::NextDayCount(3));
}

// ============================================================================
// Validation Order
// ============================================================================

#[test]
fn empty_form_fails_with_root_unanswered() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    assert_eq!(form.submit(), Err(ValidationError::RootUnanswered));
}

#[test]
fn partial_root_answers_still_fail_with_root_unanswered() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::HadDifficulties(false));
    assert_eq!(form.submit(), Err(ValidationError::RootUnanswered));
}

#[test]
fn issued_without_recipient_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.submit(), Err(ValidationError::MissingRecipient));
}

#[test]
fn other_recipient_with_blank_name_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    form.apply(AnswerEvent::OtherName("   ".to_string()));
    form.apply(AnswerEvent::OtherKind(OtherKind::EndClient));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.submit(), Err(ValidationError::MissingOtherName));
}

#[test]
fn other_recipient_without_kind_fails_after_name() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    form.apply(AnswerEvent::OtherName("Carlos".to_string()));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.submit(), Err(ValidationError::MissingOtherKind));
}

#[test]
fn not_issued_without_reason_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(false));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.submit(), Err(ValidationError::MissingNonIssuanceReason));
}

#[test]
fn difficulties_without_note_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    answer_partner_walk(&mut form);
    form.apply(AnswerEvent::HadDifficulties(true));
    form.apply(AnswerEvent::DifficultyNote("  ".to_string()));
    assert_eq!(form.submit(), Err(ValidationError::MissingDifficultyNote));
}

#[test]
fn next_day_without_count_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    answer_partner_walk(&mut form);
    form.apply(AnswerEvent::NextDayIssuance(true));
    assert_eq!(form.submit(), Err(ValidationError::MissingNextDayCount));
}

#[test]
fn next_day_with_zero_count_fails() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    answer_partner_walk(&mut form);
    form.apply(AnswerEvent::NextDayIssuance(true));
    form.apply(AnswerEvent::NextDayCount(0));
    assert_eq!(form.submit(), Err(ValidationError::MissingNextDayCount));
}

#[test]
fn rejected_submission_keeps_answers() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    let before = form.view();
    assert!(form.submit().is_err());
    assert_eq!(form.view(), before);
}

// ============================================================================
// Successful Walks
// ============================================================================

#[test]
fn partner_walk_builds_record_and_resets() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    answer_partner_walk(&mut form);
    assert_eq!(form.stage(), IntakeStage::Complete);

    let record = form.submit().unwrap();
    assert_eq!(
        record.outcome(),
        &IssuanceOutcome::Issued {
            recipient: Recipient::Partner,
        }
    );
    assert!(record.difficulty_note().is_none());
    assert!(record.next_day_count().is_none());
    assert!(form.is_empty());
    assert_eq!(form.stage(), IntakeStage::Unanswered);
}

#[test]
fn withdrawal_walk_carries_both_follow_ups() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    answer_withdrawal_walk(&mut form);

    let record = form.submit().unwrap();
    assert_eq!(
        record.outcome(),
        &IssuanceOutcome::NotIssued {
            reason: NonIssuanceReason::Withdrawal,
        }
    );
    assert_eq!(record.difficulty_note().unwrap().as_str(), "system outage");
    assert_eq!(record.next_day_count().unwrap().get(), 3);
}

#[test]
fn other_walk_trims_name() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    form.apply(AnswerEvent::OtherName("  Carlos  ".to_string()));
    form.apply(AnswerEvent::OtherKind(OtherKind::SourceUnavailable));
    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));

    let record = form.submit().unwrap();
    assert_eq!(record.detail_label(), "Carlos (Source unavailable)");
}

// ============================================================================
// Reset Cascades
// ============================================================================

#[test]
fn root_re_answer_clears_both_branches() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    form.apply(AnswerEvent::OtherName("Carlos".to_string()));
    form.apply(AnswerEvent::OtherKind(OtherKind::EndClient));

    form.apply(AnswerEvent::CertificateIssued(false));
    let view = form.view();
    assert_eq!(view.recipient, None);
    assert!(view.other_name.is_empty());
    assert_eq!(view.other_kind, None);
    assert!(view.show_non_issuance_reason);
    assert!(!view.show_recipient);
}

#[test]
fn non_other_recipient_clears_other_fields() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    form.apply(AnswerEvent::OtherName("Carlos".to_string()));
    form.apply(AnswerEvent::OtherKind(OtherKind::EndClient));

    form.apply(AnswerEvent::Recipient(RecipientChoice::Internal));
    let view = form.view();
    assert!(view.other_name.is_empty());
    assert_eq!(view.other_kind, None);
    assert!(!view.show_other_details);
}

#[test]
fn answering_no_difficulties_clears_note() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::HadDifficulties(true));
    form.apply(AnswerEvent::DifficultyNote("printer jam".to_string()));
    form.apply(AnswerEvent::HadDifficulties(false));
    assert!(form.view().difficulty_note.is_empty());
}

#[test]
fn answering_no_next_day_clears_count() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::NextDayIssuance(true));
    form.apply(AnswerEvent::NextDayCount(5));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.view().next_day_count, None);
}

#[test]
fn answers_for_hidden_questions_are_ignored() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(false));
    // Recipient block is hidden on the not-issued branch.
    form.apply(AnswerEvent::Recipient(RecipientChoice::Partner));
    assert_eq!(form.view().recipient, None);
    // Note field is hidden until difficulties is answered yes.
    form.apply(AnswerEvent::DifficultyNote("stray".to_string()));
    assert!(form.view().difficulty_note.is_empty());
    // Count field is hidden until next-day is answered yes.
    form.apply(AnswerEvent::NextDayCount(2));
    assert_eq!(form.view().next_day_count, None);
}

// ============================================================================
// Stage Progression
// ============================================================================

#[test]
fn stages_progress_through_other_walk() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    assert_eq!(form.stage(), IntakeStage::Unanswered);

    form.apply(AnswerEvent::CertificateIssued(true));
    assert_eq!(form.stage(), IntakeStage::RootAnswered);

    form.apply(AnswerEvent::Recipient(RecipientChoice::Other));
    assert_eq!(form.stage(), IntakeStage::BranchAnswered);

    form.apply(AnswerEvent::OtherName("Carlos".to_string()));
    form.apply(AnswerEvent::OtherKind(OtherKind::EndClient));
    assert_eq!(form.stage(), IntakeStage::SubfieldsAnswered);

    form.apply(AnswerEvent::HadDifficulties(false));
    form.apply(AnswerEvent::NextDayIssuance(false));
    assert_eq!(form.stage(), IntakeStage::Complete);
}

// ============================================================================
// Submit Modes
// ============================================================================

#[test]
fn explicit_mode_never_auto_commits() {
    let mut form = IntakeForm::new(SubmitMode::Explicit);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Partner));
    form.apply(AnswerEvent::HadDifficulties(false));
    assert_eq!(form.apply(AnswerEvent::NextDayIssuance(false)), None);
    assert_eq!(form.stage(), IntakeStage::Complete);
}

#[test]
fn auto_mode_commits_on_completing_answer() {
    let mut form = IntakeForm::new(SubmitMode::OnCompletion);
    assert_eq!(form.apply(AnswerEvent::CertificateIssued(true)), None);
    assert_eq!(
        form.apply(AnswerEvent::Recipient(RecipientChoice::Partner)),
        None
    );
    assert_eq!(form.apply(AnswerEvent::HadDifficulties(false)), None);

    let record = form.apply(AnswerEvent::NextDayIssuance(false)).unwrap();
    assert!(record.is_issued());
    assert!(form.is_empty());
}

#[test]
fn auto_mode_waits_for_valid_follow_up() {
    let mut form = IntakeForm::new(SubmitMode::OnCompletion);
    form.apply(AnswerEvent::CertificateIssued(true));
    form.apply(AnswerEvent::Recipient(RecipientChoice::Partner));
    form.apply(AnswerEvent::HadDifficulties(false));
    // Next-day yes opens the count question; the form is not complete yet.
    assert_eq!(form.apply(AnswerEvent::NextDayIssuance(true)), None);
    assert_eq!(form.apply(AnswerEvent::NextDayCount(0)), None);

    let record = form.apply(AnswerEvent::NextDayCount(4)).unwrap();
    assert_eq!(record.next_day_count().unwrap().get(), 4);
}

// ============================================================================
// Property Tests
// ============================================================================

fn arb_answer_event() -> impl Strategy<Value = AnswerEvent> {
    prop_oneof![
        any::<bool>().prop_map(AnswerEvent::CertificateIssued),
        prop::sample::select(&[
            RecipientChoice::Partner,
            RecipientChoice::Internal,
            RecipientChoice::Other,
        ][..])
        .prop_map(AnswerEvent::Recipient),
        "[ a-z]{0,12}".prop_map(AnswerEvent::OtherName),
        prop::sample::select(&[
            OtherKind::SourceUnavailable,
            OtherKind::InternalIssuance,
            OtherKind::EndClient,
        ][..])
        .prop_map(AnswerEvent::OtherKind),
        prop::sample::select(&[
            NonIssuanceReason::Withdrawal,
            NonIssuanceReason::BiometricMismatch,
        ][..])
        .prop_map(AnswerEvent::NonIssuanceReason),
        any::<bool>().prop_map(AnswerEvent::HadDifficulties),
        "[ a-z]{0,12}".prop_map(AnswerEvent::DifficultyNote),
        any::<bool>().prop_map(AnswerEvent::NextDayIssuance),
        (0u32..5).prop_map(AnswerEvent::NextDayCount),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Explicit mode never commits from answer events alone.
    #[test]
    fn explicit_mode_apply_never_commits(events in prop::collection::vec(arb_answer_event(), 0..40)) {
        let mut form = IntakeForm::new(SubmitMode::Explicit);
        for event in events {
            prop_assert_eq!(form.apply(event), None);
        }
    }

    /// Auto mode only ever commits records whose branch fields are
    /// consistent, and always resets the form after a commit.
    #[test]
    fn auto_mode_commits_are_consistent(events in prop::collection::vec(arb_answer_event(), 0..40)) {
        let mut form = IntakeForm::new(SubmitMode::OnCompletion);
        for event in events {
            if let Some(record) = form.apply(event) {
                match record.outcome() {
                    IssuanceOutcome::Issued { recipient } => {
                        if let Recipient::Other(other) = recipient {
                            prop_assert!(!other.name.as_str().trim().is_empty());
                        }
                    },
                    IssuanceOutcome::NotIssued { .. } => {},
                }
                if let Some(count) = record.next_day_count() {
                    prop_assert!(count.get() > 0);
                }
                prop_assert!(form.is_empty());
            }
        }
    }

    /// A failed submission never changes the held answers.
    #[test]
    fn failed_submit_preserves_answers(events in prop::collection::vec(arb_answer_event(), 0..20)) {
        let mut form = IntakeForm::new(SubmitMode::Explicit);
        for event in events {
            form.apply(event);
        }
        let before = form.view();
        if form.submit().is_err() {
            prop_assert_eq!(form.view(), before);
        }
    }
}
