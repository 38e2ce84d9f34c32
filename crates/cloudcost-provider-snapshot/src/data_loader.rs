//! Snapshot data loader
//!
//! Reads a JSON document shaped like:
//!
//! ```json
//! {
//!   "compute": [{ "resource_id": "i-01", "display_name": "web-1" }],
//!   "storage": [{ "resource_id": "orders", "size_bytes": 3221225472 }],
//!   "metrics": {
//!     "i-01": { "CPUUtilization": [{ "bucket_start": "2024-03-07T00:00:00Z", "value": 2.5 }] }
//!   },
//!   "billing": {
//!     "tags": { "Project": [{ "bucket_start": "2024-03-07T00:00:00Z",
//!                              "groups": [{ "key": "Project$web", "amount": 3.1 }] }] },
//!     "services": []
//!   },
//!   "unavailable": ["storage"]
//! }
//! ```
//!
//! Every section is optional. `unavailable` lists collaborator calls that
//! should fail (`compute`, `storage`, `metrics`, `billing`), which replays an
//! outage captured at export time.

use async_trait::async_trait;
use cloudcost_core::collaborator::{BillingSource, InventorySource, MetricSource};
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::time_window::TimeWindow;
use cloudcost_core::types::{
    BillingBucket, GroupBy, MetricSample, ResourceCategory, ResourceDescriptor, ResourceId,
    StatisticKind,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the snapshot location
pub const SNAPSHOT_ENV: &str = "CLOUDCOST_SNAPSHOT";

const METRICS_CALL: &str = "metrics";
const BILLING_CALL: &str = "billing";

/// Collaborator backed by an in-memory snapshot
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
    unavailable: HashSet<String>,
}

impl SnapshotSource {
    /// Default snapshot path: `$CLOUDCOST_SNAPSHOT`, else
    /// `<data dir>/cloudcost/snapshot.json`
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(SNAPSHOT_ENV) {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::data_dir()
            .ok_or_else(|| CloudcostError::Config("Cannot determine data directory".into()))?;
        Ok(base.join("cloudcost").join("snapshot.json"))
    }

    /// Load a snapshot file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CloudcostError::Config(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let source = Self::from_json(&content)?;
        info!(
            "Loaded snapshot {} ({} compute, {} storage resources)",
            path.display(),
            source.snapshot.compute.len(),
            source.snapshot.storage.len()
        );
        Ok(source)
    }

    /// Parse a snapshot document
    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        let unavailable = snapshot
            .unavailable
            .iter()
            .map(|call| call.to_ascii_lowercase())
            .collect();
        Ok(Self {
            snapshot,
            unavailable,
        })
    }

    fn check_available(&self, call: &str) -> Result<()> {
        if self.unavailable.contains(call) {
            return Err(CloudcostError::collaborator(
                call,
                "marked unavailable in snapshot",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InventorySource for SnapshotSource {
    async fn list_running_resources(
        &self,
        category: ResourceCategory,
    ) -> Result<Vec<ResourceDescriptor>> {
        self.check_available(category.as_str())?;

        let resources = match category {
            ResourceCategory::Compute => &self.snapshot.compute,
            ResourceCategory::Storage => &self.snapshot.storage,
            ResourceCategory::Billing => return Ok(Vec::new()),
        };

        Ok(resources
            .iter()
            .map(|r| r.to_descriptor(category))
            .collect())
    }
}

#[async_trait]
impl MetricSource for SnapshotSource {
    async fn fetch_metric_samples(
        &self,
        resource_id: &ResourceId,
        metric_name: &str,
        window: &TimeWindow,
        bucket_seconds: u64,
        kind: StatisticKind,
    ) -> Result<Vec<MetricSample>> {
        self.check_available(METRICS_CALL)?;

        let samples: Vec<MetricSample> = self
            .snapshot
            .metrics
            .get(resource_id.as_str())
            .and_then(|metrics| metrics.get(metric_name))
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| window.contains(s.bucket_start))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            "{} {} ({}, {}s buckets): {} samples",
            resource_id,
            metric_name,
            kind,
            bucket_seconds,
            samples.len()
        );

        Ok(samples)
    }
}

#[async_trait]
impl BillingSource for SnapshotSource {
    async fn fetch_billing_groups(
        &self,
        window: &TimeWindow,
        group_by: &GroupBy,
    ) -> Result<Vec<BillingBucket>> {
        self.check_available(BILLING_CALL)?;

        let buckets = match group_by {
            GroupBy::Tag(key) => self.snapshot.billing.tags.get(key),
            GroupBy::Service => Some(&self.snapshot.billing.services),
        };

        Ok(buckets
            .map(|buckets| {
                buckets
                    .iter()
                    .filter(|b| window.contains(b.bucket_start))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Snapshot schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    compute: Vec<SnapshotResource>,
    #[serde(default)]
    storage: Vec<SnapshotResource>,
    #[serde(default)]
    metrics: BTreeMap<String, BTreeMap<String, Vec<MetricSample>>>,
    #[serde(default)]
    billing: SnapshotBilling,
    #[serde(default)]
    unavailable: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotResource {
    resource_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    size_bytes: u64,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl SnapshotResource {
    fn to_descriptor(&self, category: ResourceCategory) -> ResourceDescriptor {
        ResourceDescriptor {
            resource_id: ResourceId::new(self.resource_id.clone()),
            category,
            display_name: self.display_name.clone(),
            size_bytes: self.size_bytes,
            tags: self.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SnapshotBilling {
    #[serde(default)]
    tags: BTreeMap<String, Vec<BillingBucket>>,
    #[serde(default)]
    services: Vec<BillingBucket>,
}
