//! Report pipeline
//!
//! Fetches data from the collaborators, runs the aggregation, estimation and
//! classification steps per resource, and assembles the report.
//!
//! Per-resource work inside a category is fanned out as independent futures
//! with bounded concurrency; results keep inventory order so the output is
//! deterministic. Categories run concurrently. A collaborator error only
//! fails the section it belongs to.
//!
//! # Examples
//!
//! ```no_run
//! use cloudcost::{config::ReportConfig, pipeline::ReportRunner};
//! use cloudcost_provider_snapshot::SnapshotSource;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> cloudcost::Result<()> {
//! let source = Arc::new(SnapshotSource::load(Path::new("snapshot.json")).await?);
//! let runner = ReportRunner::new(source.clone(), source.clone(), source, ReportConfig::default())?;
//! let report = runner.run(chrono::Utc::now()).await?;
//! println!("grand total: ${:.2}", report.grand_total);
//! # Ok(())
//! # }
//! ```

use crate::config::ReportConfig;
use crate::sections::{
    COMPUTE_TITLE, InstanceFinding, SERVICE_TITLE, STORAGE_TITLE, TableFinding, billing_section,
    compute_section, storage_section, tag_title,
};
use chrono::{DateTime, Utc};
use cloudcost_core::collaborator::{BillingSource, InventorySource, MetricSource};
use cloudcost_core::error::Result;
use cloudcost_core::metric_aggregator::aggregate;
use cloudcost_core::report::{Report, ReportSection, SectionFailure, assemble};
use cloudcost_core::tag_breakdown::{rank, raw_totals, tag_totals};
use cloudcost_core::time_window::{TimeWindow, WindowAlignment};
use cloudcost_core::types::{GroupBy, ResourceCategory, ResourceDescriptor, StatisticKind};
use cloudcost_core::utilization::classify_idle;
use cloudcost_pricing::CostEstimator;
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{debug, info};

/// CPU utilization metric, percent
pub const CPU_METRIC: &str = "CPUUtilization";
/// Consumed read capacity units
pub const READ_METRIC: &str = "ConsumedReadCapacityUnits";
/// Consumed write capacity units
pub const WRITE_METRIC: &str = "ConsumedWriteCapacityUnits";

/// Runs one report over injected collaborators
pub struct ReportRunner {
    inventory: Arc<dyn InventorySource>,
    metrics: Arc<dyn MetricSource>,
    billing: Arc<dyn BillingSource>,
    config: ReportConfig,
    show_progress: bool,
}

impl ReportRunner {
    /// Create a runner, validating the configuration
    ///
    /// # Errors
    ///
    /// Returns the validation error of an invalid [`ReportConfig`].
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        metrics: Arc<dyn MetricSource>,
        billing: Arc<dyn BillingSource>,
        config: ReportConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inventory,
            metrics,
            billing,
            config,
            show_progress: false,
        })
    }

    /// Enable or disable the progress spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Produce the report for the lookback window ending at `now`
    ///
    /// Only a contract violation (invalid lookback) is returned as an error;
    /// collaborator failures become placeholder sections.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Report> {
        let metric_window =
            TimeWindow::last_n_days(self.config.lookback_days, now, WindowAlignment::Now)?;
        let billing_window =
            TimeWindow::last_n_days(self.config.lookback_days, now, WindowAlignment::UtcDay)?;

        info!(
            "Building report for {} .. {} ({} days)",
            metric_window.start(),
            metric_window.end(),
            self.config.lookback_days
        );

        let progress = self.progress_bar();

        let tags_title = tag_title(&self.config.tag_key);
        let (compute, storage, tags, services) = futures::join!(
            self.compute_section(&metric_window, progress.as_ref()),
            self.storage_section(&metric_window, progress.as_ref()),
            self.tag_section(&billing_window),
            self.service_section(&billing_window),
        );

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let mut outcomes = vec![
            compute.map_err(|e| SectionFailure::new(COMPUTE_TITLE, e)),
            storage.map_err(|e| SectionFailure::new(STORAGE_TITLE, e)),
            tags.map_err(|e| SectionFailure::new(tags_title, e)),
        ];
        if let Some(services) = services {
            outcomes.push(services.map_err(|e| SectionFailure::new(SERVICE_TITLE, e)));
        }

        let report = assemble(outcomes, now);
        info!(
            "Report {} assembled: {} sections, grand total ${:.2}",
            report.run_id,
            report.sections.len(),
            report.grand_total
        );
        Ok(report)
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} resources scanned")
        {
            pb.set_style(style);
        }
        pb.set_message("Scanning resources");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }

    async fn compute_section(
        &self,
        window: &TimeWindow,
        progress: Option<&ProgressBar>,
    ) -> Result<ReportSection> {
        let instances = self
            .inventory
            .list_running_resources(ResourceCategory::Compute)
            .await?;
        debug!("{} running instances", instances.len());

        let findings: Vec<InstanceFinding> = stream::iter(instances.iter())
            .map(|instance| self.instance_finding(instance, window, progress))
            .buffered(self.config.max_concurrency)
            .try_collect()
            .await?;

        Ok(compute_section(
            &findings,
            self.config.idle_threshold_percent,
            self.config.top_n,
        ))
    }

    async fn instance_finding(
        &self,
        instance: &ResourceDescriptor,
        window: &TimeWindow,
        progress: Option<&ProgressBar>,
    ) -> Result<InstanceFinding> {
        let samples = self
            .metrics
            .fetch_metric_samples(
                &instance.resource_id,
                CPU_METRIC,
                window,
                self.config.bucket_seconds,
                StatisticKind::Average,
            )
            .await?;

        let cpu = aggregate(&samples, StatisticKind::Average);
        let utilization = classify_idle(&cpu, self.config.idle_threshold_percent);
        debug!(
            "{}: {} samples, avg CPU {:?} -> {}",
            instance.resource_id,
            samples.len(),
            cpu.value,
            utilization
        );

        if let Some(pb) = progress {
            pb.inc(1);
        }

        Ok(InstanceFinding {
            resource_id: instance.resource_id.clone(),
            label: instance.label().to_string(),
            cpu,
            utilization,
        })
    }

    async fn storage_section(
        &self,
        window: &TimeWindow,
        progress: Option<&ProgressBar>,
    ) -> Result<ReportSection> {
        let tables = self
            .inventory
            .list_running_resources(ResourceCategory::Storage)
            .await?;
        debug!("{} tables", tables.len());

        let findings: Vec<TableFinding> = stream::iter(tables.iter())
            .map(|table| self.table_finding(table, window, progress))
            .buffered(self.config.max_concurrency)
            .try_collect()
            .await?;

        Ok(storage_section(&findings, self.config.top_n))
    }

    async fn table_finding(
        &self,
        table: &ResourceDescriptor,
        window: &TimeWindow,
        progress: Option<&ProgressBar>,
    ) -> Result<TableFinding> {
        let bucket_seconds = self.config.bucket_seconds;
        let (read_samples, write_samples) = futures::try_join!(
            self.metrics.fetch_metric_samples(
                &table.resource_id,
                READ_METRIC,
                window,
                bucket_seconds,
                StatisticKind::Sum,
            ),
            self.metrics.fetch_metric_samples(
                &table.resource_id,
                WRITE_METRIC,
                window,
                bucket_seconds,
                StatisticKind::Sum,
            ),
        )?;

        let read = aggregate(&read_samples, StatisticKind::Sum);
        let write = aggregate(&write_samples, StatisticKind::Sum);
        let record =
            CostEstimator::usage_record(table, &read, &write, window.bucket_count(bucket_seconds));
        let cost = CostEstimator::estimate_record(window, &record, &self.config.pricing);

        if let Some(pb) = progress {
            pb.inc(1);
        }

        Ok(TableFinding {
            resource_id: table.resource_id.clone(),
            label: table.label().to_string(),
            read,
            write,
            cost,
        })
    }

    async fn tag_section(&self, window: &TimeWindow) -> Result<ReportSection> {
        let tag_key = &self.config.tag_key;
        let buckets = self
            .billing
            .fetch_billing_groups(window, &GroupBy::Tag(tag_key.clone()))
            .await?;
        let ranked = rank(&tag_totals(&buckets, tag_key));

        Ok(billing_section(
            tag_title(tag_key),
            &ranked,
            self.config.lookback_days,
            self.config.top_n,
        ))
    }

    async fn service_section(&self, window: &TimeWindow) -> Option<Result<ReportSection>> {
        if !self.config.include_service_breakdown {
            return None;
        }

        let section = self
            .billing
            .fetch_billing_groups(window, &GroupBy::Service)
            .await
            .map(|buckets| {
                billing_section(
                    SERVICE_TITLE,
                    &rank(&raw_totals(&buckets)),
                    self.config.lookback_days,
                    self.config.top_n,
                )
            });
        Some(section)
    }
}
