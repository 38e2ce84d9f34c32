//! Per-category report sections
//!
//! Turns the per-resource findings of one category into a [`ReportSection`]
//! with its narrative text. Costs are printed with 2 decimals, per-bucket
//! rates with 4.

use cloudcost_core::report::ReportSection;
use cloudcost_core::tag_breakdown::RankedList;
use cloudcost_core::types::{AggregateResult, ResourceId};
use cloudcost_core::utilization::Utilization;
use cloudcost_pricing::CostBreakdown;

pub const COMPUTE_TITLE: &str = "Compute instances";
pub const STORAGE_TITLE: &str = "Storage tables";
pub const SERVICE_TITLE: &str = "Cost by service";

/// Title of the tag breakdown section
pub fn tag_title(tag_key: &str) -> String {
    format!("Cost by tag {tag_key}")
}

/// Format a dollar amount with 2 decimals
pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Format a per-bucket rate with 4 decimals
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}

/// Utilization outcome for one instance
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceFinding {
    pub resource_id: ResourceId,
    pub label: String,
    pub cpu: AggregateResult,
    pub utilization: Utilization,
}

/// Cost outcome for one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableFinding {
    pub resource_id: ResourceId,
    pub label: String,
    pub read: AggregateResult,
    pub write: AggregateResult,
    pub cost: CostBreakdown,
}

impl TableFinding {
    fn has_consumption_data(&self) -> bool {
        self.read.is_present() || self.write.is_present()
    }
}

fn resource_line(label: &str, id: &ResourceId) -> String {
    if label == id.as_str() {
        label.to_string()
    } else {
        format!("{label} ({id})")
    }
}

/// Section listing idle and unclassified instances
///
/// Compute cost is not estimated, so the section cost is always absent.
pub fn compute_section(
    findings: &[InstanceFinding],
    threshold_percent: f64,
    top_n: usize,
) -> ReportSection {
    if findings.is_empty() {
        return ReportSection::new(
            COMPUTE_TITLE,
            "No running instances found (0 resources scanned).",
            None,
        );
    }

    let mut idle: Vec<&InstanceFinding> = findings
        .iter()
        .filter(|f| f.utilization == Utilization::Idle)
        .collect();
    // Lowest utilization first, then by label for stable output
    idle.sort_by(|a, b| {
        let a_cpu = a.cpu.value.unwrap_or(0.0);
        let b_cpu = b.cpu.value.unwrap_or(0.0);
        a_cpu.total_cmp(&b_cpu).then_with(|| a.label.cmp(&b.label))
    });
    let unknown: Vec<&InstanceFinding> = findings
        .iter()
        .filter(|f| f.utilization == Utilization::Unknown)
        .collect();
    let active = findings.len() - idle.len() - unknown.len();

    let mut narrative = format!(
        "{} running instances: {} idle (avg CPU < {}%), {} active, {} without data.",
        findings.len(),
        idle.len(),
        threshold_percent,
        active,
        unknown.len()
    );

    for finding in idle.iter().take(top_n) {
        let cpu = finding.cpu.value.unwrap_or(0.0);
        narrative.push_str(&format!(
            "\n• {}: avg CPU {}%",
            resource_line(&finding.label, &finding.resource_id),
            format_rate(cpu)
        ));
    }
    if idle.len() > top_n {
        narrative.push_str(&format!("\n…and {} more idle", idle.len() - top_n));
    }
    for finding in unknown.iter().take(top_n) {
        narrative.push_str(&format!(
            "\n• {}: no CPU data in window",
            resource_line(&finding.label, &finding.resource_id)
        ));
    }
    if unknown.len() > top_n {
        narrative.push_str(&format!(
            "\n…and {} more without data",
            unknown.len() - top_n
        ));
    }

    ReportSection::new(COMPUTE_TITLE, narrative, None).with_counts(findings.len(), idle.len())
}

/// Section ranking tables by estimated monthly cost
pub fn storage_section(findings: &[TableFinding], top_n: usize) -> ReportSection {
    if findings.is_empty() {
        return ReportSection::new(STORAGE_TITLE, "No tables found (0 resources scanned).", None);
    }

    let total: f64 = findings.iter().map(|f| f.cost.total_cost).sum();
    // Most expensive first; ids may repeat, so the label breaks remaining ties
    let mut ranked: Vec<&TableFinding> = findings.iter().collect();
    ranked.sort_by(|a, b| {
        b.cost
            .total_cost
            .total_cmp(&a.cost.total_cost)
            .then_with(|| a.resource_id.cmp(&b.resource_id))
            .then_with(|| a.label.cmp(&b.label))
    });

    let mut narrative = format!(
        "{} tables, estimated {}/month.",
        findings.len(),
        format_currency(total)
    );

    for finding in ranked.iter().take(top_n) {
        narrative.push_str(&format!(
            "\n• {}: {} (read {}, write {}, storage {})",
            resource_line(&finding.label, &finding.resource_id),
            format_currency(finding.cost.total_cost),
            format_currency(finding.cost.read()),
            format_currency(finding.cost.write()),
            format_currency(finding.cost.storage()),
        ));
        if finding.has_consumption_data() {
            narrative.push_str(&format!(
                ", avg {} RCU / {} WCU per bucket",
                format_rate(finding.read.value.unwrap_or(0.0)),
                format_rate(finding.write.value.unwrap_or(0.0))
            ));
        } else {
            narrative.push_str(", no consumption data");
        }
    }
    if ranked.len() > top_n {
        narrative.push_str(&format!("\n…and {} more tables", ranked.len() - top_n));
    }

    ReportSection::new(STORAGE_TITLE, narrative, Some(total)).with_counts(findings.len(), 0)
}

/// Section listing actual spend per group over the lookback window
///
/// This is billed spend, not an estimate, so the section cost is absent and
/// the amounts only appear in the narrative.
pub fn billing_section(
    title: impl Into<String>,
    ranked: &RankedList,
    lookback_days: u32,
    top_n: usize,
) -> ReportSection {
    let title = title.into();
    if ranked.is_empty() {
        return ReportSection::new(
            title,
            format!("No billing data for the last {lookback_days} days."),
            None,
        );
    }

    let mut narrative = format!(
        "Spend over the last {} days: {} across {} groups.",
        lookback_days,
        format_currency(ranked.total()),
        ranked.len()
    );
    for entry in ranked.top(top_n) {
        narrative.push_str(&format!(
            "\n• {}: {}",
            entry.key,
            format_currency(entry.amount)
        ));
    }
    if ranked.len() > top_n {
        narrative.push_str(&format!("\n…and {} more", ranked.len() - top_n));
    }

    ReportSection::new(title, narrative, None)
}
