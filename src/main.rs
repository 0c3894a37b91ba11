mod cloud_watch_metrics_client;
mod collector;
mod error;
mod metric;
mod report;
mod time_range;
mod validate;

use std::process;

use anyhow::Context;
use chrono::Utc;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cloud_watch_metrics_client::CloudWatchMetricsClient;
use crate::collector::MetricsCollector;
use crate::report::write_report;
use crate::validate::{validate, Args};

#[tokio::main(basic_scheduler)]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = match validate(&args, Utc::now(), &mut Args::command()) {
        Ok(settings) => settings,
        Err(error) => process::exit(error.exit_code()),
    };
    info!(?settings, "datapoints report to be fetched");

    let collector = MetricsCollector::new(
        CloudWatchMetricsClient::new(),
        &settings.function_name,
        settings.time_range.clone(),
        settings.layout,
    )?;
    let records = collector
        .fetch()
        .await
        .with_context(|| format!("failed to fetch datapoints of {}", settings.function_name))?;
    write_report(&records, &settings.report_path)?;
    Ok(())
}
