//! Monthly cost estimation from windowed usage
//!
//! The estimator recovers window totals from per-bucket averages, scales
//! them to a 30-day month and prices them with a [`PricingModel`].
//!
//! # Examples
//!
//! ```
//! use cloudcost_core::time_window::{TimeWindow, WindowAlignment};
//! use cloudcost_core::types::{AggregateResult, StatisticKind};
//! use cloudcost_pricing::{CostEstimator, PricingModel};
//! use chrono::Utc;
//!
//! let window = TimeWindow::last_n_days(7, Utc::now(), WindowAlignment::Now).unwrap();
//! let absent = AggregateResult::absent(StatisticKind::Sum);
//! let pricing = PricingModel::on_demand(0.25, 1.25, 0.25).unwrap();
//!
//! let cost = CostEstimator::estimate_monthly_cost(
//!     &window,
//!     &absent,
//!     &absent,
//!     window.bucket_count(3600),
//!     3 * 1024 * 1024 * 1024,
//!     &pricing,
//! );
//! assert_eq!(cost.storage(), 0.75);
//! assert_eq!(cost.total_cost, 0.75);
//! ```

use crate::pricing_model::{PricingModel, READ_UNIT, STORAGE_UNIT, WRITE_UNIT};
use cloudcost_core::time_window::TimeWindow;
use cloudcost_core::types::{AggregateResult, ResourceDescriptor, ResourceUsageRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Days in the month every estimate is normalized to
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Request units per priced block
pub const UNITS_PER_PRICE_BLOCK: f64 = 1_000_000.0;
/// Binary gigabyte
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub const READ_COMPONENT: &str = "read";
pub const WRITE_COMPONENT: &str = "write";
pub const STORAGE_COMPONENT: &str = "storage";

/// Cost components and their total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub component_costs: BTreeMap<String, f64>,
    pub total_cost: f64,
}

impl CostBreakdown {
    fn from_components(read: f64, write: f64, storage: f64) -> Self {
        let component_costs = BTreeMap::from([
            (READ_COMPONENT.to_string(), read),
            (WRITE_COMPONENT.to_string(), write),
            (STORAGE_COMPONENT.to_string(), storage),
        ]);
        Self {
            component_costs,
            total_cost: read + write + storage,
        }
    }

    /// Cost of one component, zero when absent
    pub fn component(&self, name: &str) -> f64 {
        self.component_costs.get(name).copied().unwrap_or(0.0)
    }

    pub fn read(&self) -> f64 {
        self.component(READ_COMPONENT)
    }

    pub fn write(&self) -> f64 {
        self.component(WRITE_COMPONENT)
    }

    pub fn storage(&self) -> f64 {
        self.component(STORAGE_COMPONENT)
    }
}

/// Stateless monthly cost estimator
pub struct CostEstimator;

impl CostEstimator {
    /// Estimate a resource's monthly cost from per-bucket usage aggregates
    ///
    /// # Arguments
    ///
    /// * `window` - Lookback window the aggregates cover
    /// * `consumed_read` - Mean read units per bucket
    /// * `consumed_write` - Mean write units per bucket
    /// * `buckets_per_window` - Number of buckets in `window`
    /// * `size_bytes` - Static resource size
    /// * `pricing` - Unit prices
    ///
    /// An absent aggregate counts as zero usage: for billing, no usage costs
    /// nothing. A unit missing from `pricing` is priced at zero.
    pub fn estimate_monthly_cost(
        window: &TimeWindow,
        consumed_read: &AggregateResult,
        consumed_write: &AggregateResult,
        buckets_per_window: u64,
        size_bytes: u64,
        pricing: &PricingModel,
    ) -> CostBreakdown {
        let read_total = Self::window_total(consumed_read, buckets_per_window);
        let write_total = Self::window_total(consumed_write, buckets_per_window);

        Self::price_window_totals(window, read_total, write_total, size_bytes, pricing)
    }

    /// Window usage record for a table from its per-bucket read/write means
    pub fn usage_record(
        resource: &ResourceDescriptor,
        consumed_read: &AggregateResult,
        consumed_write: &AggregateResult,
        buckets_per_window: u64,
    ) -> ResourceUsageRecord {
        ResourceUsageRecord {
            resource_id: resource.resource_id.clone(),
            category: resource.category,
            size_bytes: resource.size_bytes,
            consumed_units: BTreeMap::from([
                (
                    READ_UNIT.to_string(),
                    Self::window_total(consumed_read, buckets_per_window),
                ),
                (
                    WRITE_UNIT.to_string(),
                    Self::window_total(consumed_write, buckets_per_window),
                ),
            ]),
        }
    }

    /// Estimate from a usage record whose consumed units are window totals
    pub fn estimate_record(
        window: &TimeWindow,
        record: &ResourceUsageRecord,
        pricing: &PricingModel,
    ) -> CostBreakdown {
        Self::price_window_totals(
            window,
            record.units(READ_UNIT),
            record.units(WRITE_UNIT),
            record.size_bytes,
            pricing,
        )
    }

    /// Units over the whole window; an absent aggregate counts as zero
    fn window_total(aggregate: &AggregateResult, buckets_per_window: u64) -> f64 {
        aggregate.value.unwrap_or(0.0) * buckets_per_window as f64
    }

    fn price_window_totals(
        window: &TimeWindow,
        read_total: f64,
        write_total: f64,
        size_bytes: u64,
        pricing: &PricingModel,
    ) -> CostBreakdown {
        let scale = DAYS_PER_MONTH / window.length_days();
        let monthly_reads = read_total * scale;
        let monthly_writes = write_total * scale;

        let read_cost =
            (monthly_reads / UNITS_PER_PRICE_BLOCK) * pricing.price(READ_UNIT).unwrap_or(0.0);
        let write_cost =
            (monthly_writes / UNITS_PER_PRICE_BLOCK) * pricing.price(WRITE_UNIT).unwrap_or(0.0);
        let storage_cost =
            (size_bytes as f64 / BYTES_PER_GB) * pricing.price(STORAGE_UNIT).unwrap_or(0.0);

        let breakdown = CostBreakdown::from_components(read_cost, write_cost, storage_cost);

        debug!(
            "Estimated ${:.6}/month ({:.0} reads, {:.0} writes, {} bytes)",
            breakdown.total_cost, monthly_reads, monthly_writes, size_bytes
        );

        breakdown
    }
}
