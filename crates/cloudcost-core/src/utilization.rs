//! Idle classification of aggregated utilization

use crate::types::AggregateResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization verdict for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Utilization {
    /// Data present and strictly below the threshold
    Idle,
    /// Data present and at or above the threshold
    Active,
    /// No data in the lookback window
    Unknown,
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utilization::Idle => write!(f, "idle"),
            Utilization::Active => write!(f, "active"),
            Utilization::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a utilization aggregate against `threshold_percent`
///
/// An absent aggregate is always `Unknown`, whatever the threshold. The
/// comparison is strict: a value equal to the threshold is `Active`.
///
/// # Examples
/// ```
/// use cloudcost_core::types::{AggregateResult, StatisticKind};
/// use cloudcost_core::utilization::{classify_idle, Utilization};
///
/// let agg = AggregateResult { kind: StatisticKind::Average, value: Some(3.0) };
/// assert_eq!(classify_idle(&agg, 5.0), Utilization::Idle);
/// assert_eq!(classify_idle(&agg, 3.0), Utilization::Active);
/// ```
pub fn classify_idle(agg: &AggregateResult, threshold_percent: f64) -> Utilization {
    match agg.value {
        None => Utilization::Unknown,
        Some(value) if value < threshold_percent => Utilization::Idle,
        Some(_) => Utilization::Active,
    }
}
