//! Core types, traits, and aggregation logic for cloudcost
//!
//! This crate provides the domain types, error handling, lookback windows,
//! metric aggregation, idle classification, billing breakdowns and report
//! assembly used by all other cloudcost crates.

pub mod collaborator;
pub mod error;
pub mod metric_aggregator;
pub mod report;
pub mod tag_breakdown;
pub mod time_window;
pub mod timezone;
pub mod types;
pub mod utilization;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CloudcostError, Result};
pub use report::{Report, ReportSection, ReportSummary, SectionFailure};
pub use time_window::{TimeWindow, WindowAlignment};
pub use types::{
    AggregateResult, BillingBucket, BillingGroup, GroupBy, MetricSample, ResourceCategory,
    ResourceDescriptor, ResourceId, ResourceUsageRecord, StatisticKind,
};
pub use utilization::Utilization;
