//! Report assembly
//!
//! The assembler merges per-category [`ReportSection`]s into one [`Report`]
//! with per-section subtotals and a grand total. Sections keep the order they
//! were supplied in. A section whose data could not be collected arrives as a
//! [`SectionFailure`] and is replaced by a placeholder, so one failing
//! category never hides the others.
//!
//! # Examples
//!
//! ```
//! use cloudcost_core::report::{assemble, ReportSection, SectionFailure};
//! use cloudcost_core::error::CloudcostError;
//! use chrono::Utc;
//!
//! let outcomes = vec![
//!     Ok(ReportSection::new("Storage", "2 tables", Some(12.5))),
//!     Err(SectionFailure::new(
//!         "Compute",
//!         CloudcostError::collaborator("inventory", "timed out"),
//!     )),
//! ];
//! let report = assemble(outcomes, Utc::now());
//!
//! assert_eq!(report.sections.len(), 2);
//! assert_eq!(report.grand_total, 12.5);
//! assert!(report.sections[1].estimated_monthly_cost.is_none());
//! ```

use crate::error::CloudcostError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Whether a section carries real data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Ok,
    Failed,
}

/// One category of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section heading, unique within a report
    pub title: String,
    /// Rendered body text for the chat channel
    pub narrative: String,
    /// Estimated monthly cost; `None` means "not estimated", not $0
    pub estimated_monthly_cost: Option<f64>,
    /// Resources inspected for this section
    #[serde(default)]
    pub resources_scanned: usize,
    /// Resources flagged idle
    #[serde(default)]
    pub idle_count: usize,
    pub status: SectionStatus,
}

impl ReportSection {
    /// Create a healthy section
    pub fn new(
        title: impl Into<String>,
        narrative: impl Into<String>,
        estimated_monthly_cost: Option<f64>,
    ) -> Self {
        Self {
            title: title.into(),
            narrative: narrative.into(),
            estimated_monthly_cost,
            resources_scanned: 0,
            idle_count: 0,
            status: SectionStatus::Ok,
        }
    }

    /// Record how many resources were scanned and how many are idle
    pub fn with_counts(mut self, resources_scanned: usize, idle_count: usize) -> Self {
        self.resources_scanned = resources_scanned;
        self.idle_count = idle_count;
        self
    }

    /// Placeholder for a category whose data could not be collected
    pub fn placeholder(title: impl Into<String>, error: &CloudcostError) -> Self {
        Self {
            title: title.into(),
            narrative: format!("Could not collect data for this section: {error}"),
            estimated_monthly_cost: None,
            resources_scanned: 0,
            idle_count: 0,
            status: SectionStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SectionStatus::Failed
    }
}

/// A section that could not be produced
#[derive(Debug)]
pub struct SectionFailure {
    pub title: String,
    pub error: CloudcostError,
}

impl SectionFailure {
    pub fn new(title: impl Into<String>, error: CloudcostError) -> Self {
        Self {
            title: title.into(),
            error,
        }
    }
}

/// Complete report for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Identifier of the run that produced this report
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Sections in the order they were supplied
    pub sections: Vec<ReportSection>,
    /// `(title, subtotal)` per section, same order as `sections`
    pub service_totals: Vec<(String, f64)>,
    pub grand_total: f64,
}

/// Structured summary of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_resources_scanned: usize,
    pub idle_count: usize,
    pub per_category_totals: Vec<(String, f64)>,
    pub grand_total: f64,
    /// Titles of sections replaced by placeholders
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed_sections: Vec<String>,
}

impl Report {
    /// Subtotal for the section titled `title`
    pub fn service_total(&self, title: &str) -> Option<f64> {
        self.service_totals
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, amount)| *amount)
    }

    /// Section titled `title`
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Derive the structured summary
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_resources_scanned: self.sections.iter().map(|s| s.resources_scanned).sum(),
            idle_count: self.sections.iter().map(|s| s.idle_count).sum(),
            per_category_totals: self.service_totals.clone(),
            grand_total: self.grand_total,
            failed_sections: self
                .sections
                .iter()
                .filter(|s| s.is_failed())
                .map(|s| s.title.clone())
                .collect(),
        }
    }
}

/// Assemble section outcomes into a report
pub fn assemble<I>(outcomes: I, generated_at: DateTime<Utc>) -> Report
where
    I: IntoIterator<Item = std::result::Result<ReportSection, SectionFailure>>,
{
    let sections: Vec<ReportSection> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Ok(section) => section,
            Err(failure) => {
                warn!("Section '{}' failed: {}", failure.title, failure.error);
                ReportSection::placeholder(failure.title, &failure.error)
            }
        })
        .collect();

    let service_totals: Vec<(String, f64)> = sections
        .iter()
        .map(|s| (s.title.clone(), s.estimated_monthly_cost.unwrap_or(0.0)))
        .collect();

    let grand_total = service_totals.iter().map(|(_, amount)| amount).sum();

    Report {
        run_id: Uuid::new_v4(),
        generated_at,
        sections,
        service_totals,
        grand_total,
    }
}
