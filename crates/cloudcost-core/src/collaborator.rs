//! Collaborator traits for inventory, metering, billing and notification
//!
//! The report pipeline only talks to the outside world through these traits.
//! Implementations are thin I/O wrappers; they may return empty sequences,
//! which are valid inputs and never errors.

use crate::error::Result;
use crate::time_window::TimeWindow;
use crate::types::{
    BillingBucket, GroupBy, MetricSample, ResourceCategory, ResourceDescriptor, ResourceId,
    StatisticKind,
};
use async_trait::async_trait;

/// Lists running resources per category
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_running_resources(
        &self,
        category: ResourceCategory,
    ) -> Result<Vec<ResourceDescriptor>>;
}

/// Retrieves per-bucket metric samples for one resource
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch_metric_samples(
        &self,
        resource_id: &ResourceId,
        metric_name: &str,
        window: &TimeWindow,
        bucket_seconds: u64,
        kind: StatisticKind,
    ) -> Result<Vec<MetricSample>>;
}

/// Queries grouped billing amounts
#[async_trait]
pub trait BillingSource: Send + Sync {
    async fn fetch_billing_groups(
        &self,
        window: &TimeWindow,
        group_by: &GroupBy,
    ) -> Result<Vec<BillingBucket>>;
}

/// Delivers the rendered report text to a chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}
