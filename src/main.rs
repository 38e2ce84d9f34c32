//! cloudcost - Build the cloud cost digest and post it to a chat channel

use cloudcost::{
    cli::{Cli, Command, ReportArgs},
    notifier::{WebhookNotifier, deliver},
    output::{OutputFormat, get_formatter},
    pipeline::ReportRunner,
};
use clap::Parser;
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::timezone::DisplayTimezone;
use cloudcost_provider_snapshot::SnapshotSource;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The --quiet flag overrides RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cloudcost=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.command.is_none() {
        info!("No command specified, running report");
    }
    let result = match cli.command_or_default() {
        Command::Report(args) => run_report(args).await,
        Command::CheckConfig(args) => check_config(&args),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(exit_code(&e));
    }
}

/// 2 for an invalid configuration, 1 for any other failure
fn exit_code(error: &CloudcostError) -> i32 {
    if error.is_fatal() { 2 } else { 1 }
}

fn check_config(args: &ReportArgs) -> Result<()> {
    let config = args.to_config()?;
    DisplayTimezone::resolve(args.timezone.as_deref())?;
    if let Some(url) = &args.webhook_url {
        WebhookNotifier::new(url.as_str())?;
    }
    println!("Configuration OK");
    println!("{config:#?}");
    Ok(())
}

async fn run_report(args: ReportArgs) -> Result<()> {
    let config = args.to_config()?;
    let timezone = DisplayTimezone::resolve(args.timezone.as_deref())?;
    info!("Using timezone: {}", timezone.name());

    let notifier = match (&args.webhook_url, args.dry_run) {
        (Some(url), false) => Some(WebhookNotifier::new(url.as_str())?),
        _ => None,
    };

    let path = match &args.snapshot {
        Some(path) => path.clone(),
        None => SnapshotSource::default_path()?,
    };
    let source = Arc::new(SnapshotSource::load(&path).await?);

    let format = args.output_format();
    let show_progress = format != OutputFormat::Json && is_terminal::is_terminal(std::io::stdout());
    let runner = ReportRunner::new(source.clone(), source.clone(), source, config)?
        .with_progress(show_progress);
    let report = runner.run(chrono::Utc::now()).await?;

    let formatter = get_formatter(format, timezone);
    println!("{}", formatter.format_report(&report));

    if let Some(notifier) = notifier {
        let text = get_formatter(OutputFormat::Text, timezone).format_report(&report);
        deliver(&notifier, &text).await;
    }

    Ok(())
}
