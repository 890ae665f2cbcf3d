//! Session-scoped recorder for front-desk certificate-issuance outcomes.
//!
//! A guided intake decision tree produces immutable service records, an
//! append-only session ledger accumulates them, and pure projections turn
//! the list into summary statistics and a renderable report view-model.
//!
//! # Architecture
//!
//! ```text
//! AnswerEvent ──► IntakeForm ──validate──► ServiceRecord
//!                                              │ append
//!                                              ▼
//!                                        SessionLedger
//!                                              │ fold (on demand)
//!                                              ▼
//!                                           Summary ──► ReportData
//! ```
//!
//! The [`desk::Desk`] controller owns the form and the ledger and wires the
//! boundary collaborators: a [`notify::Notifier`] for (severity, message)
//! pairs and a [`report::ReportExporter`] for the image artifact. Rendering,
//! toast delivery, and the export mechanism live outside this crate.
//!
//! Everything is single-threaded and synchronous: mutations happen only in
//! response to discrete calls, and the ledger is exclusively owned by the
//! controller.
//!
//! # Example
//!
//! ```rust
//! use certdesk_core::config::DeskConfig;
//! use certdesk_core::desk::Desk;
//! use certdesk_core::intake::{AnswerEvent, RecipientChoice};
//! use certdesk_core::notify::NullNotifier;
//!
//! let mut desk = Desk::new(DeskConfig::default());
//! let mut notifier = NullNotifier;
//!
//! desk.apply(AnswerEvent::CertificateIssued(true), &mut notifier)
//!     .unwrap();
//! desk.apply(
//!     AnswerEvent::Recipient(RecipientChoice::Partner),
//!     &mut notifier,
//! )
//! .unwrap();
//! desk.apply(AnswerEvent::HadDifficulties(false), &mut notifier)
//!     .unwrap();
//! desk.apply(AnswerEvent::NextDayIssuance(false), &mut notifier)
//!     .unwrap();
//!
//! desk.submit(&mut notifier).unwrap();
//! assert_eq!(desk.summary().issued_to_partner, 1);
//! ```

pub mod config;
pub mod desk;
pub mod intake;
pub mod ledger;
pub mod notify;
pub mod record;
pub mod report;
pub mod summary;

pub use config::{ConfigError, DeskConfig, IntakeConfig, ReportConfig};
pub use desk::{Desk, DeskError};
pub use intake::{
    AnswerEvent, IntakeForm, IntakeStage, IntakeView, RecipientChoice, SubmitMode, ValidationError,
};
pub use ledger::{LedgerError, SessionLedger};
pub use notify::{Notifier, NullNotifier, Severity};
pub use record::{
    DifficultyNote, IssuanceOutcome, NextDayCount, NonIssuanceReason, OtherKind, OtherRecipient,
    Recipient, RecipientName, RecordId, ServiceRecord,
};
pub use report::{ExportError, ReportData, ReportExporter};
pub use summary::Summary;
