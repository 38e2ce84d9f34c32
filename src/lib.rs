//! cloudcost - Recurring cloud cost and utilization digest
//!
//! This library provides functionality to:
//! - Flag idle compute instances from their average CPU utilization
//! - Estimate the monthly cost of storage tables from consumed capacity
//! - Break actual spend down by a cost-allocation tag and by service
//! - Render the result as chat text, a terminal table, or JSON
//! - Post the digest to a chat incoming webhook
//!
//! # Examples
//!
//! ```no_run
//! use cloudcost::{
//!     config::ReportConfig,
//!     output::{OutputFormat, get_formatter},
//!     pipeline::ReportRunner,
//! };
//! use cloudcost_core::timezone::DisplayTimezone;
//! use cloudcost_provider_snapshot::SnapshotSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> cloudcost::Result<()> {
//!     let path = SnapshotSource::default_path()?;
//!     let source = Arc::new(SnapshotSource::load(&path).await?);
//!     let runner =
//!         ReportRunner::new(source.clone(), source.clone(), source, ReportConfig::default())?;
//!
//!     let report = runner.run(chrono::Utc::now()).await?;
//!     let formatter = get_formatter(OutputFormat::Text, DisplayTimezone::default());
//!     println!("{}", formatter.format_report(&report));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod notifier;
pub mod output;
pub mod pipeline;
pub mod sections;

// Re-export commonly used types
pub use cloudcost_core::{CloudcostError, Report, ReportSection, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
