//! Append-only session record ledger.
//!
//! The ledger is the in-memory, session-scoped list of completed
//! [`ServiceRecord`]s. Records are appended by the controller after a
//! successful intake walk and are never mutated or removed; there is no
//! truncation or compaction. The only failure is the capacity guard, which
//! refuses appends past a fixed bound rather than growing without limit.

use serde::Serialize;
use thiserror::Error;

use crate::record::ServiceRecord;

/// Default maximum number of records held in one session.
///
/// A front desk records a few dozen events per day; the bound exists to
/// keep memory growth fail-closed, not as an expected working limit.
pub const MAX_SESSION_RECORDS: usize = 4096;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The session record limit was reached.
    #[error("session ledger capacity {max} exceeded")]
    CapacityExceeded {
        /// The configured capacity.
        max: usize,
    },
}

/// Append-only, in-memory record list for one front-desk session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionLedger {
    records: Vec<ServiceRecord>,
    #[serde(skip)]
    capacity: usize,
}

impl SessionLedger {
    /// Creates an empty ledger with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSION_RECORDS)
    }

    /// Creates an empty ledger with an explicit capacity.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CapacityExceeded`] when the ledger is full;
    /// the record is not appended.
    pub fn append(&mut self, record: ServiceRecord) -> Result<(), LedgerError> {
        if self.records.len() >= self.capacity {
            tracing::warn!(
                target: "certdesk::ledger",
                capacity = self.capacity,
                "refusing append: session ledger full"
            );
            return Err(LedgerError::CapacityExceeded { max: self.capacity });
        }
        tracing::debug!(
            target: "certdesk::ledger",
            record_id = %record.id(),
            total = self.records.len() + 1,
            "record appended"
        );
        self.records.push(record);
        Ok(())
    }

    /// Returns the records in append order.
    #[must_use]
    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if the ledger has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the records in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceRecord> {
        self.records.iter()
    }
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SessionLedger {
    type Item = &'a ServiceRecord;
    type IntoIter = std::slice::Iter<'a, ServiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::record::{IssuanceOutcome, Recipient};

    fn partner_record() -> ServiceRecord {
        ServiceRecord::new(
            IssuanceOutcome::Issued {
                recipient: Recipient::Partner,
            },
            None,
            None,
        )
    }

    #[test]
    fn append_preserves_order() {
        let mut ledger = SessionLedger::new();
        let first = partner_record();
        let second = partner_record();
        let (first_id, second_id) = (first.id(), second.id());

        ledger.append(first).unwrap();
        ledger.append(second).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.records()[0].id(), first_id);
        assert_eq!(ledger.records()[1].id(), second_id);
    }

    #[test]
    fn capacity_guard_refuses_append() {
        let mut ledger = SessionLedger::with_capacity(1);
        ledger.append(partner_record()).unwrap();
        assert!(ledger.is_full());
        assert_eq!(
            ledger.append(partner_record()),
            Err(LedgerError::CapacityExceeded { max: 1 })
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn empty_ledger_reports_empty() {
        let ledger = SessionLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(!ledger.is_full());
    }
}
