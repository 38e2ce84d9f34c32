//! Core domain types for cloudcost
//!
//! This module contains the fundamental types shared by the aggregation,
//! pricing and reporting code: resource identifiers, categories, raw metric
//! samples and billing groups as returned by collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strongly-typed resource identifier
///
/// Wraps an instance id, table name or any other collaborator-assigned id.
///
/// # Examples
/// ```
/// use cloudcost_core::types::ResourceId;
///
/// let id = ResourceId::new("i-0abc123");
/// assert_eq!(id.as_str(), "i-0abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new ResourceId from any string-like type
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resource category a report section covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// Virtual machines / compute instances
    Compute,
    /// Tables and other provisioned storage
    Storage,
    /// Billing-only views (tag or service breakdowns)
    Billing,
}

impl ResourceCategory {
    /// Lowercase name used in snapshot files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Compute => "compute",
            ResourceCategory::Storage => "storage",
            ResourceCategory::Billing => "billing",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistic requested from the metering collaborator for each bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticKind {
    /// Per-bucket average of the raw datapoints
    Average,
    /// Per-bucket sum of the raw datapoints
    Sum,
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticKind::Average => write!(f, "Average"),
            StatisticKind::Sum => write!(f, "Sum"),
        }
    }
}

/// One reporting-period datapoint from a metering source
///
/// An absent `value` is distinct from `Some(0.0)`: the collaborator returned
/// the bucket but without a datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Start of the bucket this sample covers
    pub bucket_start: DateTime<Utc>,
    /// Bucket value, if the collaborator reported one
    #[serde(default)]
    pub value: Option<f64>,
}

impl MetricSample {
    /// Create a sample with a present value
    pub fn new(bucket_start: DateTime<Utc>, value: f64) -> Self {
        Self {
            bucket_start,
            value: Some(value),
        }
    }

    /// Create a sample whose value was not reported
    pub fn missing(bucket_start: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            value: None,
        }
    }
}

/// Aggregate of a sample sequence for one statistic kind
///
/// `value` is `None` when there were no samples at all. Callers must
/// propagate that absence: no data is not the same as zero usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Statistic the underlying samples were fetched with
    pub kind: StatisticKind,
    /// Mean per-bucket value, or `None` for an empty sequence
    pub value: Option<f64>,
}

impl AggregateResult {
    /// Aggregate carrying no data
    pub fn absent(kind: StatisticKind) -> Self {
        Self { kind, value: None }
    }

    /// Whether the aggregate carries a value
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// A running resource as returned by the inventory collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Collaborator-assigned id
    pub resource_id: ResourceId,
    /// Category the resource was listed under
    pub category: ResourceCategory,
    /// Human-friendly name (a Name tag, the table name, ...)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Static size (table size for storage, 0 for compute)
    #[serde(default)]
    pub size_bytes: u64,
    /// Resource tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    /// Create a descriptor without tags or display name
    pub fn new(resource_id: impl Into<String>, category: ResourceCategory) -> Self {
        Self {
            resource_id: ResourceId::new(resource_id),
            category,
            display_name: None,
            size_bytes: 0,
            tags: BTreeMap::new(),
        }
    }

    /// Set the static size
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name for reports: display name when known, else the id
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(self.resource_id.as_str())
    }
}

/// Usage totals for one resource over one lookback window
///
/// `consumed_units` maps a pricing unit name to the number of units consumed
/// during the whole window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsageRecord {
    pub resource_id: ResourceId,
    pub category: ResourceCategory,
    pub size_bytes: u64,
    pub consumed_units: BTreeMap<String, f64>,
}

impl ResourceUsageRecord {
    /// Units consumed for `unit`, zero when not metered
    pub fn units(&self, unit: &str) -> f64 {
        self.consumed_units.get(unit).copied().unwrap_or(0.0)
    }
}

/// One group in a billing query response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingGroup {
    /// Raw group key, e.g. `Project$web` for tag groupings
    pub key: String,
    /// Amount in the billing currency
    pub amount: f64,
}

impl BillingGroup {
    pub fn new(key: impl Into<String>, amount: f64) -> Self {
        Self {
            key: key.into(),
            amount,
        }
    }
}

/// One time bucket of a billing query response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingBucket {
    /// Start of the billing period
    pub bucket_start: DateTime<Utc>,
    /// Groups reported for this period
    #[serde(default)]
    pub groups: Vec<BillingGroup>,
}

/// Grouping requested from the billing collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupBy {
    /// Group by a cost-allocation tag key
    Tag(String),
    /// Group by service dimension
    Service,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Tag(key) => write!(f, "tag:{key}"),
            GroupBy::Service => write!(f, "service"),
        }
    }
}
