//! Pure aggregation of session records into a summary.
//!
//! [`Summary::from_records`] is a total, deterministic fold over the record
//! list: no side effects, no cached state, recomputed fresh on every call.
//! Malformed records cannot reach it because only the intake path constructs
//! records, so there is no error path.

use serde::{Deserialize, Serialize};

use crate::record::{IssuanceOutcome, NonIssuanceReason, Recipient, ServiceRecord};

/// Derived statistics for all records currently in the session.
///
/// Counts and totals are commutative over the input order;
/// `difficulty_notes` preserves the input (append) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Certificates issued to indicating partners.
    pub issued_to_partner: u64,
    /// Certificates issued to internal staff.
    pub issued_to_internal: u64,
    /// Certificates issued to other recipients.
    pub issued_to_other: u64,
    /// Services ending in client withdrawal.
    pub withdrawals: u64,
    /// Services ending in a biometric mismatch.
    pub biometric_mismatches: u64,
    /// Sum of the three issued counts.
    pub total_issued: u64,
    /// Difficulty notes in record order.
    pub difficulty_notes: Vec<String>,
    /// Sum of next-day counts across records that have one.
    pub next_day_total: u64,
}

impl Summary {
    /// Aggregates a record list into a summary.
    ///
    /// Each record increments exactly one of the five category counters,
    /// per its outcome branch.
    #[must_use]
    pub fn from_records(records: &[ServiceRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.outcome() {
                IssuanceOutcome::Issued { recipient } => match recipient {
                    Recipient::Partner => {
                        summary.issued_to_partner = summary.issued_to_partner.saturating_add(1);
                    },
                    Recipient::Internal => {
                        summary.issued_to_internal = summary.issued_to_internal.saturating_add(1);
                    },
                    Recipient::Other(_) => {
                        summary.issued_to_other = summary.issued_to_other.saturating_add(1);
                    },
                },
                IssuanceOutcome::NotIssued { reason } => match reason {
                    NonIssuanceReason::Withdrawal => {
                        summary.withdrawals = summary.withdrawals.saturating_add(1);
                    },
                    NonIssuanceReason::BiometricMismatch => {
                        summary.biometric_mismatches =
                            summary.biometric_mismatches.saturating_add(1);
                    },
                },
            }

            if let Some(note) = record.difficulty_note() {
                summary.difficulty_notes.push(note.as_str().to_string());
            }

            if let Some(count) = record.next_day_count() {
                summary.next_day_total = summary.next_day_total.saturating_add(count.get().into());
            }
        }
        summary.total_issued = summary
            .issued_to_partner
            .saturating_add(summary.issued_to_internal)
            .saturating_add(summary.issued_to_other);
        summary
    }

    /// Returns the number of services that did not end in issuance.
    #[must_use]
    pub const fn total_not_issued(&self) -> u64 {
        self.withdrawals + self.biometric_mismatches
    }

    /// Returns the share of services that ended in issuance, in
    /// `[0.0, 1.0]`.
    ///
    /// Yields `0.0` for an empty session instead of dividing by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let denominator = self.total_issued + self.total_not_issued();
        if denominator == 0 {
            return 0.0;
        }
        self.total_issued as f64 / denominator as f64
    }
}
