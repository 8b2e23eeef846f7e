//! alias-controller - converge function alias satellite configuration.

use std::sync::Arc;

use alias_controller::commands::Cli;
use alias_controller::config::Config;
use alias_controller::lambda::LambdaHttpClient;
use alias_controller::output::print_error;
use alias_reconcile::TracingRecorder;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Prefer RUST_LOG, fall back to ALIAS_LOG_LEVEL. Logs go to stderr so
    // command output on stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    info!(endpoint = %config.lambda_endpoint, "Configuration loaded");

    let client = Arc::new(LambdaHttpClient::new(&config)?);
    let metrics = Arc::new(TracingRecorder::new());

    let result = cli.run(config, client, metrics.clone()).await;

    let stats = metrics.stats();
    debug!(calls = stats.calls, errors = stats.errors, "API call totals");
    result
}
