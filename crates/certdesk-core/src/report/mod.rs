//! Report view-model projection.
//!
//! A [`ReportData`] is a pure projection of a [`Summary`] plus a generation
//! timestamp into the shapes the render and export collaborators consume:
//! labelled stat cards, a zero-filtered distribution chart, a three-bar
//! comparison chart, the ordered difficulty-note list, and the export
//! filename. Nothing here renders; localized date formatting, colors, and
//! layout belong to the collaborators.
//!
//! A report is only available once the session holds at least one record;
//! [`ReportData::from_ledger`] returns `None` for an empty session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ReportConfig;
use crate::ledger::SessionLedger;
use crate::summary::Summary;

/// Fixed report header title.
pub const REPORT_TITLE: &str = "ISSUANCE REPORT";

/// Errors surfaced by the export flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// No records exist yet, so there is nothing to report.
    #[error("no records to report")]
    EmptySession,

    /// The export collaborator failed.
    #[error("export failed: {reason}")]
    Failed {
        /// The collaborator's failure description.
        reason: String,
    },
}

/// Produces an image artifact from a report view-model.
///
/// The core never sees the mechanism (canvas, headless browser, plotter);
/// it only supplies the data and surfaces the outcome as a notification.
pub trait ReportExporter {
    /// Exports the report.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Failed`] when the artifact could not be
    /// produced.
    fn export(&mut self, report: &ReportData) -> Result<(), ExportError>;
}

/// One labelled counter on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    /// The card caption.
    pub label: String,
    /// The counter value.
    pub value: u64,
}

/// One slice of the distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlice {
    /// The slice caption.
    pub label: String,
    /// The slice value; always greater than zero (zero slices are
    /// filtered out before they reach the chart).
    pub value: u64,
}

/// One bar of the comparison chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBar {
    /// The bar caption.
    pub label: String,
    /// The bar value; zero bars are kept so the three categories always
    /// line up.
    pub value: u64,
}

/// The renderable report view-model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    /// Report header title.
    pub title: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The six stat cards, in layout order.
    pub cards: Vec<StatCard>,
    /// The total-issued banner value.
    pub total_issued: u64,
    /// Distribution chart slices, zero values filtered out.
    pub distribution: Vec<ChartSlice>,
    /// Comparison chart bars: issued, not issued, next day.
    pub comparison: Vec<ChartBar>,
    /// Difficulty notes in record order; empty means the section is
    /// omitted.
    pub difficulty_notes: Vec<String>,
    /// Filename prefix for [`ReportData::png_filename`].
    pub filename_prefix: String,
}

impl ReportData {
    /// Builds the report for the current session, or `None` while the
    /// ledger is empty.
    #[must_use]
    pub fn from_ledger(
        ledger: &SessionLedger,
        config: &ReportConfig,
        generated_at: DateTime<Utc>,
    ) -> Option<Self> {
        if ledger.is_empty() {
            return None;
        }
        let summary = Summary::from_records(ledger.records());
        Some(Self::from_summary(&summary, config, generated_at))
    }

    /// Projects a summary into the report view-model.
    #[must_use]
    pub fn from_summary(
        summary: &Summary,
        config: &ReportConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let cards = vec![
            StatCard {
                label: "Issued to partners".to_string(),
                value: summary.issued_to_partner,
            },
            StatCard {
                label: "Issued to internal staff".to_string(),
                value: summary.issued_to_internal,
            },
            StatCard {
                label: "Issued to others".to_string(),
                value: summary.issued_to_other,
            },
            StatCard {
                label: "Withdrawals".to_string(),
                value: summary.withdrawals,
            },
            StatCard {
                label: "Biometric mismatches".to_string(),
                value: summary.biometric_mismatches,
            },
            StatCard {
                label: "Next-day issuances".to_string(),
                value: summary.next_day_total,
            },
        ];

        let distribution = [
            ("Partners", summary.issued_to_partner),
            ("Internal", summary.issued_to_internal),
            ("Others", summary.issued_to_other),
            ("Withdrawals", summary.withdrawals),
            ("Biometric mismatch", summary.biometric_mismatches),
        ]
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .map(|(label, value)| ChartSlice {
            label: label.to_string(),
            value,
        })
        .collect();

        let comparison = vec![
            ChartBar {
                label: "Issued".to_string(),
                value: summary.total_issued,
            },
            ChartBar {
                label: "Not issued".to_string(),
                value: summary.total_not_issued(),
            },
            ChartBar {
                label: "Next day".to_string(),
                value: summary.next_day_total,
            },
        ];

        Self {
            title: REPORT_TITLE.to_string(),
            generated_at,
            cards,
            total_issued: summary.total_issued,
            distribution,
            comparison,
            difficulty_notes: summary.difficulty_notes.clone(),
            filename_prefix: config.filename_prefix.clone(),
        }
    }

    /// Returns the export filename, `{prefix}-DD-MM-YYYY.png`, stamped
    /// with the generation date.
    #[must_use]
    pub fn png_filename(&self) -> String {
        format!(
            "{}-{}.png",
            self.filename_prefix,
            self.generated_at.format("%d-%m-%Y")
        )
    }
}

#[cfg(test)]
mod unit_tests {
    use chrono::TimeZone;

    use super::*;
    use crate::record::{IssuanceOutcome, NonIssuanceReason, ServiceRecord};

    fn sample_summary() -> Summary {
        Summary {
            issued_to_partner: 2,
            issued_to_internal: 0,
            issued_to_other: 1,
            withdrawals: 1,
            biometric_mismatches: 0,
            total_issued: 3,
            difficulty_notes: vec!["system outage".to_string()],
            next_day_total: 4,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 9, 14, 30, 0).unwrap()
    }

    #[test]
    fn empty_ledger_yields_no_report() {
        let ledger = SessionLedger::new();
        let config = ReportConfig::default();
        assert!(ReportData::from_ledger(&ledger, &config, generated_at()).is_none());
    }

    #[test]
    fn non_empty_ledger_yields_report() {
        let mut ledger = SessionLedger::new();
        ledger
            .append(ServiceRecord::new(
                IssuanceOutcome::NotIssued {
                    reason: NonIssuanceReason::Withdrawal,
                },
                None,
                None,
            ))
            .unwrap();
        let config = ReportConfig::default();
        let report = ReportData::from_ledger(&ledger, &config, generated_at()).unwrap();
        assert_eq!(report.total_issued, 0);
        assert_eq!(report.title, REPORT_TITLE);
    }

    #[test]
    fn zero_slices_are_filtered() {
        let report =
            ReportData::from_summary(&sample_summary(), &ReportConfig::default(), generated_at());
        let labels: Vec<&str> = report
            .distribution
            .iter()
            .map(|slice| slice.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Partners", "Others", "Withdrawals"]);
        assert!(report.distribution.iter().all(|slice| slice.value > 0));
    }

    #[test]
    fn comparison_keeps_all_three_bars() {
        let report =
            ReportData::from_summary(&sample_summary(), &ReportConfig::default(), generated_at());
        assert_eq!(report.comparison.len(), 3);
        assert_eq!(report.comparison[0].value, 3);
        assert_eq!(report.comparison[1].value, 1);
        assert_eq!(report.comparison[2].value, 4);
    }

    #[test]
    fn cards_mirror_the_summary() {
        let report =
            ReportData::from_summary(&sample_summary(), &ReportConfig::default(), generated_at());
        assert_eq!(report.cards.len(), 6);
        assert_eq!(report.cards[0].value, 2);
        assert_eq!(report.cards[5].value, 4);
        assert_eq!(report.difficulty_notes, vec!["system outage"]);
    }

    #[test]
    fn png_filename_stamps_the_generation_date() {
        let report =
            ReportData::from_summary(&sample_summary(), &ReportConfig::default(), generated_at());
        assert_eq!(report.png_filename(), "issuance-report-09-07-2024.png");
    }

    #[test]
    fn png_filename_honours_custom_prefix() {
        let config = ReportConfig {
            filename_prefix: "front-desk".to_string(),
        };
        let report = ReportData::from_summary(&sample_summary(), &config, generated_at());
        assert_eq!(report.png_filename(), "front-desk-09-07-2024.png");
    }

    #[test]
    fn report_for_empty_summary_has_no_slices() {
        let report =
            ReportData::from_summary(&Summary::default(), &ReportConfig::default(), generated_at());
        assert!(report.distribution.is_empty());
        assert_eq!(report.total_issued, 0);
        assert!(report.difficulty_notes.is_empty());
    }
}
