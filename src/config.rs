//! Report configuration
//!
//! Everything a run needs is carried in one [`ReportConfig`] value that is
//! passed to the pipeline explicitly. Validation happens once, up front:
//! an invalid configuration is a contract violation and no report is
//! produced.

use chrono::Utc;
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::time_window::{TimeWindow, WindowAlignment};
use cloudcost_pricing::PricingModel;

/// Default lookback in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
/// Default idle threshold, percent CPU
pub const DEFAULT_IDLE_THRESHOLD: f64 = 5.0;
/// Default metric bucket length (one hour)
pub const DEFAULT_BUCKET_SECONDS: u64 = 3600;
/// Default cost-allocation tag
pub const DEFAULT_TAG_KEY: &str = "Project";
/// Default length of ranked lists
pub const DEFAULT_TOP_N: usize = 5;
/// Default bound on concurrent collaborator calls per section
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Settings for one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Days of history to inspect
    pub lookback_days: u32,
    /// CPU percentage below which an instance is idle
    pub idle_threshold_percent: f64,
    /// Metric bucket length in seconds
    pub bucket_seconds: u64,
    /// Tag key for the billing breakdown
    pub tag_key: String,
    /// Entries shown in ranked lists
    pub top_n: usize,
    /// Concurrent per-resource collaborator calls
    pub max_concurrency: usize,
    /// Include the per-service billing breakdown
    pub include_service_breakdown: bool,
    /// Unit prices for storage estimates
    pub pricing: PricingModel,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            idle_threshold_percent: DEFAULT_IDLE_THRESHOLD,
            bucket_seconds: DEFAULT_BUCKET_SECONDS,
            tag_key: DEFAULT_TAG_KEY.to_string(),
            top_n: DEFAULT_TOP_N,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            include_service_breakdown: true,
            pricing: PricingModel::default(),
        }
    }
}

impl ReportConfig {
    /// Check invariants the pipeline relies on
    ///
    /// # Errors
    ///
    /// [`CloudcostError::ContractViolation`] for a zero or out-of-range
    /// lookback, a non-finite or negative threshold, or zero
    /// bucket/concurrency/top-N values; [`CloudcostError::Config`] for an empty tag key.
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days < 1 {
            return Err(CloudcostError::ContractViolation(
                "lookback_days must be at least 1".to_string(),
            ));
        }
        TimeWindow::last_n_days(self.lookback_days, Utc::now(), WindowAlignment::UtcDay)?;
        if !self.idle_threshold_percent.is_finite() || self.idle_threshold_percent < 0.0 {
            return Err(CloudcostError::ContractViolation(format!(
                "idle threshold must be a finite non-negative percentage, got {}",
                self.idle_threshold_percent
            )));
        }
        if self.bucket_seconds == 0 {
            return Err(CloudcostError::ContractViolation(
                "bucket_seconds must be positive".to_string(),
            ));
        }
        if self.max_concurrency == 0 || self.top_n == 0 {
            return Err(CloudcostError::ContractViolation(
                "max_concurrency and top_n must be positive".to_string(),
            ));
        }
        if self.tag_key.trim().is_empty() {
            return Err(CloudcostError::Config("tag key must not be empty".to_string()));
        }
        Ok(())
    }
}
