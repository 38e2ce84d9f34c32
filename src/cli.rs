//! CLI interface for cloudcost
//!
//! Every setting can be given as a flag or through its `CLOUDCOST_*`
//! environment variable, so the binary can run unattended from a scheduler.
//! When no subcommand is given, `report` runs with its defaults.
//!
//! # Example
//!
//! ```bash
//! # Weekly digest posted to a chat channel
//! CLOUDCOST_WEBHOOK_URL=https://hooks.example.com/T000 cloudcost report
//!
//! # Two weeks, lower idle threshold, table on the terminal
//! cloudcost report --lookback-days 14 --idle-threshold 2.5 --table
//!
//! # Validate the configuration only
//! cloudcost check-config --read-price -1
//! ```

use crate::config::{
    DEFAULT_BUCKET_SECONDS, DEFAULT_IDLE_THRESHOLD, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_TAG_KEY, DEFAULT_TOP_N, ReportConfig,
};
use crate::notifier::WEBHOOK_ENV;
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use cloudcost_core::error::Result;
use cloudcost_pricing::PricingModel;
use cloudcost_pricing::pricing_model::{
    DEFAULT_READ_PRICE, DEFAULT_STORAGE_PRICE, DEFAULT_WRITE_PRICE,
};
use std::path::PathBuf;

/// Recurring cloud cost and utilization digest
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The selected command, `report` when none was given
    ///
    /// The default is parsed rather than built from [`ReportArgs::default`]
    /// so `CLOUDCOST_*` variables still apply.
    pub fn command_or_default(&self) -> Command {
        match &self.command {
            Some(command) => command.clone(),
            None => match Cli::parse_from(["cloudcost", "report"]).command {
                Some(command) => command,
                None => Command::Report(ReportArgs::default()),
            },
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the report, print it and post it to the chat channel
    Report(ReportArgs),

    /// Validate the configuration and exit
    CheckConfig(ReportArgs),
}

/// Settings for one report run
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Days of history to inspect
    #[arg(long, env = "CLOUDCOST_LOOKBACK_DAYS", default_value_t = DEFAULT_LOOKBACK_DAYS)]
    pub lookback_days: u32,

    /// CPU percentage below which an instance counts as idle
    #[arg(long, env = "CLOUDCOST_IDLE_THRESHOLD", default_value_t = DEFAULT_IDLE_THRESHOLD)]
    pub idle_threshold: f64,

    /// Metric bucket length in seconds
    #[arg(long, env = "CLOUDCOST_BUCKET_SECONDS", default_value_t = DEFAULT_BUCKET_SECONDS)]
    pub bucket_seconds: u64,

    /// Cost-allocation tag for the billing breakdown
    #[arg(long, env = "CLOUDCOST_TAG_KEY", default_value = DEFAULT_TAG_KEY)]
    pub tag_key: String,

    /// Entries shown in ranked lists
    #[arg(long, env = "CLOUDCOST_TOP", default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Concurrent collaborator calls per section
    #[arg(long, env = "CLOUDCOST_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Price per million read units
    #[arg(long, env = "CLOUDCOST_READ_PRICE", default_value_t = DEFAULT_READ_PRICE, allow_negative_numbers = true)]
    pub read_price: f64,

    /// Price per million write units
    #[arg(long, env = "CLOUDCOST_WRITE_PRICE", default_value_t = DEFAULT_WRITE_PRICE, allow_negative_numbers = true)]
    pub write_price: f64,

    /// Price per GB-month of storage
    #[arg(long, env = "CLOUDCOST_STORAGE_PRICE", default_value_t = DEFAULT_STORAGE_PRICE, allow_negative_numbers = true)]
    pub storage_price: f64,

    /// Skip the per-service billing breakdown
    #[arg(long, env = "CLOUDCOST_NO_SERVICE_BREAKDOWN")]
    pub no_service_breakdown: bool,

    /// Snapshot file (defaults to $CLOUDCOST_SNAPSHOT or the data directory)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Incoming-webhook URL of the chat channel
    #[arg(long, env = WEBHOOK_ENV)]
    pub webhook_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, env = "CLOUDCOST_FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "table")]
    pub json: bool,

    /// Shorthand for --format table
    #[arg(long)]
    pub table: bool,

    /// Timezone for displayed timestamps (e.g. "Europe/Berlin"); defaults to local
    #[arg(long, short = 'z', env = "CLOUDCOST_TIMEZONE")]
    pub timezone: Option<String>,

    /// Print the report without posting it
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            bucket_seconds: DEFAULT_BUCKET_SECONDS,
            tag_key: DEFAULT_TAG_KEY.to_string(),
            top: DEFAULT_TOP_N,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            read_price: DEFAULT_READ_PRICE,
            write_price: DEFAULT_WRITE_PRICE,
            storage_price: DEFAULT_STORAGE_PRICE,
            no_service_breakdown: false,
            snapshot: None,
            webhook_url: None,
            format: OutputFormat::Text,
            json: false,
            table: false,
            timezone: None,
            dry_run: false,
        }
    }
}

impl ReportArgs {
    /// Build and validate the run configuration
    ///
    /// # Errors
    ///
    /// Invalid prices or report settings are returned as
    /// [`cloudcost_core::CloudcostError::ContractViolation`].
    pub fn to_config(&self) -> Result<ReportConfig> {
        let pricing =
            PricingModel::on_demand(self.read_price, self.write_price, self.storage_price)?;
        let config = ReportConfig {
            lookback_days: self.lookback_days,
            idle_threshold_percent: self.idle_threshold,
            bucket_seconds: self.bucket_seconds,
            tag_key: self.tag_key.clone(),
            top_n: self.top,
            max_concurrency: self.max_concurrency,
            include_service_breakdown: !self.no_service_breakdown,
            pricing,
        };
        config.validate()?;
        Ok(config)
    }

    /// Effective output format after the shorthand flags
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.table {
            OutputFormat::Table
        } else {
            self.format
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use cloudcost_core::error::CloudcostError;

    fn report_args(args: &[&str]) -> ReportArgs {
        let mut argv = vec!["cloudcost", "report"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Some(Command::Report(args)) => args,
            other => panic!("expected report command, got {other:?}"),
        }
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["cloudcost"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_default_command_is_report() {
        let cli = Cli::parse_from(["cloudcost"]);
        assert!(matches!(cli.command_or_default(), Command::Report(_)));
    }

    #[test]
    fn test_report_flags() {
        let args = report_args(&[
            "--lookback-days",
            "14",
            "--idle-threshold",
            "2.5",
            "--tag-key",
            "Team",
            "--top",
            "3",
            "--no-service-breakdown",
            "--dry-run",
        ]);
        let config = args.to_config().unwrap();
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.idle_threshold_percent, 2.5);
        assert_eq!(config.tag_key, "Team");
        assert_eq!(config.top_n, 3);
        assert!(!config.include_service_breakdown);
        assert!(args.dry_run);
    }

    #[test]
    fn test_default_args_match_default_config() {
        let config = ReportArgs::default().to_config().unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_negative_price_is_contract_violation() {
        let args = report_args(&["--storage-price", "-1"]);
        assert!(matches!(
            args.to_config(),
            Err(CloudcostError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_zero_lookback_is_contract_violation() {
        let args = report_args(&["--lookback-days", "0"]);
        assert!(matches!(
            args.to_config(),
            Err(CloudcostError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_webhook_url_reads_its_env_var() {
        let command = Cli::command();
        let report = command.find_subcommand("report").unwrap();
        let webhook = report
            .get_arguments()
            .find(|arg| arg.get_id() == "webhook_url")
            .unwrap();
        assert_eq!(
            webhook.get_env(),
            Some(std::ffi::OsStr::new("CLOUDCOST_WEBHOOK_URL"))
        );
        assert_eq!(WEBHOOK_ENV, "CLOUDCOST_WEBHOOK_URL");
    }

    #[test]
    fn test_output_format_shorthands() {
        assert_eq!(report_args(&[]).output_format(), OutputFormat::Text);
        assert_eq!(report_args(&["--json"]).output_format(), OutputFormat::Json);
        assert_eq!(report_args(&["--table"]).output_format(), OutputFormat::Table);
        assert_eq!(
            report_args(&["--format", "table"]).output_format(),
            OutputFormat::Table
        );
        assert!(Cli::try_parse_from(["cloudcost", "report", "--json", "--table"]).is_err());
    }

    #[test]
    fn test_check_config_command() {
        let cli = Cli::parse_from(["cloudcost", "-q", "check-config", "--top", "0"]);
        assert!(cli.quiet);
        let Some(Command::CheckConfig(args)) = cli.command else {
            panic!("expected check-config");
        };
        assert!(args.to_config().is_err());
    }
}
