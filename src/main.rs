use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use finding_fuji::{config::AppConfig, models::event::InvocationEvent, pipeline::Pipeline};

/// Post today's view from the office camera to Slack.
#[derive(Debug, Parser)]
#[command(name = "finding-fuji", version)]
struct Cli {
    /// Invocation event as JSON, e.g. '{"photo_shoot_time": 1700000000000}'
    #[arg(long, env = "INVOCATION_EVENT", conflicts_with = "photo_shoot_time")]
    event: Option<String>,

    /// Snapshot time in milliseconds since the Unix epoch (defaults to now)
    #[arg(long)]
    photo_shoot_time: Option<i64>,
}

impl Cli {
    fn invocation_event(&self) -> Result<InvocationEvent, serde_json::Error> {
        match &self.event {
            Some(json) => serde_json::from_str(json),
            None => Ok(InvocationEvent {
                photo_shoot_time: self.photo_shoot_time,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let event = match cli.invocation_event() {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Invalid invocation event");
            return ExitCode::FAILURE;
        }
    };

    // Load configuration from environment; nothing external runs without it
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, kind = "Configuration", "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, kind = %e.kind(), "Failed to initialize clients");
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run(&event, chrono::Utc::now()).await {
        Ok(report) => {
            tracing::info!(
                export_id = %report.export_id,
                found_mt_fuji = report.verdict.found_mt_fuji,
                delivered = report.notification.is_delivered(),
                "Invocation complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, kind = %e.kind(), "Invocation failed");
            ExitCode::FAILURE
        }
    }
}
