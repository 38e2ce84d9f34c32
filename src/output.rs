//! Output formatting for cloudcost reports
//!
//! This module renders a [`Report`] in different formats:
//! - Text for the chat channel (one block per section)
//! - Table format for terminal output
//! - JSON for machine-readable output (structured summary + sections)
//!
//! # Examples
//!
//! ```
//! use cloudcost::output::{OutputFormat, get_formatter};
//! use cloudcost_core::report::{assemble, ReportSection};
//! use cloudcost_core::timezone::DisplayTimezone;
//! use chrono::Utc;
//!
//! let report = assemble(
//!     vec![Ok(ReportSection::new("Storage tables", "1 table", Some(0.75)))],
//!     Utc::now(),
//! );
//!
//! let formatter = get_formatter(OutputFormat::Text, DisplayTimezone::utc());
//! let text = formatter.format_report(&report);
//! assert!(text.contains("$0.75"));
//! ```

use crate::sections::format_currency;
use cloudcost_core::report::{Report, ReportSection};
use cloudcost_core::timezone::DisplayTimezone;
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Chat-style narrative
    Text,
    /// Summary table
    Table,
    /// JSON summary and sections
    Json,
}

/// Trait for report formatters
pub trait ReportFormatter {
    fn format_report(&self, report: &Report) -> String;
}

fn section_cost_label(section: &ReportSection) -> String {
    if section.is_failed() {
        return "unavailable".to_string();
    }
    match section.estimated_monthly_cost {
        Some(cost) => format!("{}/month", format_currency(cost)),
        None => "not estimated".to_string(),
    }
}

/// Narrative formatter for the chat channel
pub struct TextFormatter {
    timezone: DisplayTimezone,
}

impl TextFormatter {
    pub fn new(timezone: DisplayTimezone) -> Self {
        Self { timezone }
    }
}

impl ReportFormatter for TextFormatter {
    fn format_report(&self, report: &Report) -> String {
        let mut out = format!(
            "*Cloud cost digest* ({})\nEstimated monthly total: {}",
            self.timezone.format(&report.generated_at),
            format_currency(report.grand_total)
        );

        let failed: Vec<&str> = report
            .sections
            .iter()
            .filter(|s| s.is_failed())
            .map(|s| s.title.as_str())
            .collect();
        if !failed.is_empty() {
            out.push_str(&format!(
                "\n:warning: Partial report, missing data for: {}",
                failed.join(", ")
            ));
        }

        for section in &report.sections {
            out.push_str(&format!(
                "\n\n*{}* ({})\n{}",
                section.title,
                section_cost_label(section),
                section.narrative
            ));
        }

        out
    }
}

/// Summary table for terminal output
pub struct TableFormatter {
    timezone: DisplayTimezone,
}

impl TableFormatter {
    pub fn new(timezone: DisplayTimezone) -> Self {
        Self { timezone }
    }
}

impl ReportFormatter for TableFormatter {
    fn format_report(&self, report: &Report) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Section",
            b -> "Status",
            b -> "Resources",
            b -> "Idle",
            b -> "Monthly Cost"
        ]);

        for section in &report.sections {
            let status = if section.is_failed() {
                "FAILED".red().to_string()
            } else if section.idle_count > 0 {
                "IDLE FOUND".yellow().to_string()
            } else {
                "OK".green().to_string()
            };
            table.add_row(row![
                section.title,
                status,
                r -> section.resources_scanned,
                r -> section.idle_count,
                r -> section_cost_label(section)
            ]);
        }

        let summary = report.summary();
        table.add_row(row![
            b -> "TOTAL",
            "",
            rb -> summary.total_resources_scanned,
            rb -> summary.idle_count,
            rb -> format_currency(report.grand_total)
        ]);

        format!(
            "Cloud cost digest, generated {}\n{}",
            self.timezone.format(&report.generated_at),
            table
        )
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> String {
        let value = json!({
            "run_id": report.run_id,
            "generated_at": report.generated_at,
            "summary": report.summary(),
            "sections": report.sections,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

/// Create a formatter for `format`
pub fn get_formatter(format: OutputFormat, timezone: DisplayTimezone) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(timezone)),
        OutputFormat::Table => Box::new(TableFormatter::new(timezone)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
