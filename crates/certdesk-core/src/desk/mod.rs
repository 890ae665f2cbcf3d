//! Top-level desk controller.
//!
//! [`Desk`] owns the configuration, the intake form, and the session
//! ledger — the single owned state container for one front-desk session.
//! Collaborators (notifier, exporter) are injected per call, never held as
//! ambient state, so the core stays testable without any rendering
//! framework.
//!
//! All mutations happen synchronously in response to discrete calls; there
//! is no background work and no locking. The only "cancel" is
//! [`Desk::abandon_intake`], which discards unsaved answers — no partial
//! record ever exists outside the transient form state.

use chrono::Utc;
use thiserror::Error;

use crate::config::DeskConfig;
use crate::intake::{AnswerEvent, IntakeForm, IntakeView, SubmitMode, ValidationError};
use crate::ledger::{LedgerError, SessionLedger};
use crate::notify::{Notifier, Severity, messages};
use crate::record::{RecordId, ServiceRecord};
use crate::report::{ExportError, ReportData, ReportExporter};
use crate::summary::Summary;

/// Errors surfaced by the desk controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskError {
    /// A submission failed validation; the ledger is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The session ledger refused the record.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Controller owning the intake form and the session ledger.
#[derive(Debug)]
pub struct Desk {
    config: DeskConfig,
    form: IntakeForm,
    ledger: SessionLedger,
}

impl Desk {
    /// Creates a desk for a new session.
    #[must_use]
    pub fn new(config: DeskConfig) -> Self {
        let form = IntakeForm::new(config.intake.submit_mode);
        Self {
            config,
            form,
            ledger: SessionLedger::new(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Forwards one answer event to the intake form.
    ///
    /// In auto-submit mode, the event that completes the form commits the
    /// record: it is appended to the ledger, the success notification is
    /// emitted, and the new record id is returned. In explicit mode this
    /// always returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Ledger`] when the session is full and an
    /// auto-commit would otherwise drop the record; the answer is not
    /// applied.
    pub fn apply(
        &mut self,
        event: AnswerEvent,
        notifier: &mut dyn Notifier,
    ) -> Result<Option<RecordId>, DeskError> {
        // Checked before the form can complete: an auto-commit against a
        // full ledger would discard an already-built record.
        if self.form.mode() == SubmitMode::OnCompletion && self.ledger.is_full() {
            notifier.notify(Severity::Error, messages::SESSION_FULL);
            return Err(DeskError::Ledger(LedgerError::CapacityExceeded {
                max: self.ledger.capacity(),
            }));
        }
        match self.form.apply(event) {
            Some(record) => self.commit(record, notifier).map(Some),
            None => Ok(None),
        }
    }

    /// Explicitly submits the current intake walk.
    ///
    /// On success the record is appended and the success notification
    /// emitted. On validation failure the error's operator message is
    /// emitted, the form keeps its answers, and the ledger is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Validation`] for an incomplete or inconsistent
    /// walk, or [`DeskError::Ledger`] when the session is full.
    pub fn submit(&mut self, notifier: &mut dyn Notifier) -> Result<RecordId, DeskError> {
        if self.ledger.is_full() {
            notifier.notify(Severity::Error, messages::SESSION_FULL);
            return Err(DeskError::Ledger(LedgerError::CapacityExceeded {
                max: self.ledger.capacity(),
            }));
        }
        match self.form.submit() {
            Ok(record) => self.commit(record, notifier),
            Err(err) => {
                notifier.notify(Severity::Error, err.user_message());
                Err(DeskError::Validation(err))
            },
        }
    }

    /// Discards the in-progress intake answers.
    pub fn abandon_intake(&mut self) {
        tracing::debug!(target: "certdesk::desk", "abandoning in-progress intake");
        self.form.reset();
    }

    /// Returns the render snapshot of the intake form.
    #[must_use]
    pub fn intake_view(&self) -> IntakeView {
        self.form.view()
    }

    /// Returns the session records in append order.
    #[must_use]
    pub fn records(&self) -> &[ServiceRecord] {
        self.ledger.records()
    }

    /// Aggregates the current session into a summary.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from_records(self.ledger.records())
    }

    /// Builds the report view-model, or `None` while the session is empty.
    #[must_use]
    pub fn report(&self) -> Option<ReportData> {
        ReportData::from_ledger(&self.ledger, &self.config.report, Utc::now())
    }

    /// Runs the export flow: build the report, fire the exporter, surface
    /// the outcome as notifications.
    ///
    /// Export failures never affect session data.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptySession`] when no record exists yet, or
    /// the collaborator's [`ExportError::Failed`].
    pub fn export_report(
        &self,
        exporter: &mut dyn ReportExporter,
        notifier: &mut dyn Notifier,
    ) -> Result<(), ExportError> {
        let Some(report) = self.report() else {
            notifier.notify(Severity::Error, messages::EMPTY_SESSION);
            return Err(ExportError::EmptySession);
        };
        notifier.notify(Severity::Info, messages::EXPORT_STARTED);
        match exporter.export(&report) {
            Ok(()) => {
                tracing::info!(
                    target: "certdesk::desk",
                    filename = %report.png_filename(),
                    "report exported"
                );
                notifier.notify(Severity::Success, messages::EXPORT_DONE);
                Ok(())
            },
            Err(err) => {
                tracing::warn!(target: "certdesk::desk", error = %err, "report export failed");
                notifier.notify(Severity::Error, messages::EXPORT_FAILED);
                Err(err)
            },
        }
    }

    /// Appends a validated record and emits the success notification.
    fn commit(
        &mut self,
        record: ServiceRecord,
        notifier: &mut dyn Notifier,
    ) -> Result<RecordId, DeskError> {
        let id = record.id();
        self.ledger.append(record)?;
        tracing::info!(
            target: "certdesk::desk",
            record_id = %id,
            total = self.ledger.len(),
            "service recorded"
        );
        notifier.notify(Severity::Success, messages::RECORD_SAVED);
        Ok(id)
    }
}
