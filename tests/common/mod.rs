//! Common test utilities and helpers for cloudcost tests
//!
//! Provides an in-memory fake cloud implementing every collaborator trait,
//! with switches to make individual calls fail.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cloudcost_core::collaborator::{BillingSource, InventorySource, MetricSource};
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::time_window::TimeWindow;
use cloudcost_core::types::{
    BillingBucket, BillingGroup, GroupBy, MetricSample, ResourceCategory, ResourceDescriptor,
    ResourceId, StatisticKind,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed "now" used by the pipeline tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap()
}

/// Hourly samples ending one hour before [`test_now`]
pub fn hourly_samples(values: &[Option<f64>]) -> Vec<MetricSample> {
    let count = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let bucket_start = test_now() - Duration::hours(count - i as i64);
            MetricSample {
                bucket_start,
                value: *value,
            }
        })
        .collect()
}

/// One daily billing bucket a few days before [`test_now`]
pub fn billing_bucket(days_ago: i64, groups: &[(&str, f64)]) -> BillingBucket {
    let day = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap() - Duration::days(days_ago);
    BillingBucket {
        bucket_start: day,
        groups: groups
            .iter()
            .map(|(key, amount)| BillingGroup::new(*key, *amount))
            .collect(),
    }
}

/// In-memory cloud
#[derive(Default)]
pub struct FakeCloud {
    compute: Vec<ResourceDescriptor>,
    storage: Vec<ResourceDescriptor>,
    metrics: BTreeMap<(String, String), Vec<MetricSample>>,
    tag_billing: Vec<BillingBucket>,
    service_billing: Vec<BillingBucket>,
    failing: HashSet<&'static str>,
    failing_resources: HashSet<String>,
    metric_calls: AtomicUsize,
    billing_requests: Mutex<Vec<GroupBy>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, id: &str, cpu: &[Option<f64>]) -> Self {
        self.compute
            .push(ResourceDescriptor::new(id, ResourceCategory::Compute));
        self.metrics.insert(
            (id.to_string(), "CPUUtilization".to_string()),
            hourly_samples(cpu),
        );
        self
    }

    pub fn with_table(
        mut self,
        id: &str,
        size_bytes: u64,
        reads: &[Option<f64>],
        writes: &[Option<f64>],
    ) -> Self {
        self.storage.push(
            ResourceDescriptor::new(id, ResourceCategory::Storage).with_size_bytes(size_bytes),
        );
        self.metrics.insert(
            (id.to_string(), "ConsumedReadCapacityUnits".to_string()),
            hourly_samples(reads),
        );
        self.metrics.insert(
            (id.to_string(), "ConsumedWriteCapacityUnits".to_string()),
            hourly_samples(writes),
        );
        self
    }

    pub fn with_tag_billing(mut self, bucket: BillingBucket) -> Self {
        self.tag_billing.push(bucket);
        self
    }

    pub fn with_service_billing(mut self, bucket: BillingBucket) -> Self {
        self.service_billing.push(bucket);
        self
    }

    /// Make a call fail: "compute", "storage", "metrics" or "billing"
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    /// Make metric calls for one resource fail
    pub fn failing_resource(mut self, id: &str) -> Self {
        self.failing_resources.insert(id.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn metric_calls(&self) -> usize {
        self.metric_calls.load(Ordering::SeqCst)
    }

    pub fn billing_requests(&self) -> Vec<GroupBy> {
        self.billing_requests.lock().unwrap().clone()
    }

    fn check(&self, call: &'static str) -> Result<()> {
        if self.failing.contains(call) {
            return Err(CloudcostError::collaborator(call, "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl InventorySource for FakeCloud {
    async fn list_running_resources(
        &self,
        category: ResourceCategory,
    ) -> Result<Vec<ResourceDescriptor>> {
        match category {
            ResourceCategory::Compute => {
                self.check("compute")?;
                Ok(self.compute.clone())
            }
            ResourceCategory::Storage => {
                self.check("storage")?;
                Ok(self.storage.clone())
            }
            ResourceCategory::Billing => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl MetricSource for FakeCloud {
    async fn fetch_metric_samples(
        &self,
        resource_id: &ResourceId,
        metric_name: &str,
        window: &TimeWindow,
        _bucket_seconds: u64,
        _kind: StatisticKind,
    ) -> Result<Vec<MetricSample>> {
        self.metric_calls.fetch_add(1, Ordering::SeqCst);
        self.check("metrics")?;
        if self.failing_resources.contains(resource_id.as_str()) {
            return Err(CloudcostError::collaborator("metrics", "throttled"));
        }
        Ok(self
            .metrics
            .get(&(resource_id.to_string(), metric_name.to_string()))
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| window.contains(s.bucket_start))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl BillingSource for FakeCloud {
    async fn fetch_billing_groups(
        &self,
        window: &TimeWindow,
        group_by: &GroupBy,
    ) -> Result<Vec<BillingBucket>> {
        self.billing_requests.lock().unwrap().push(group_by.clone());
        self.check("billing")?;
        let buckets = match group_by {
            GroupBy::Tag(_) => &self.tag_billing,
            GroupBy::Service => &self.service_billing,
        };
        Ok(buckets
            .iter()
            .filter(|b| window.contains(b.bucket_start))
            .cloned()
            .collect())
    }
}
