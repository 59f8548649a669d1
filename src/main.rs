//! tekton-sli CLI
//!
//! Tekton PipelineRun success rate and failure reports for runbooks.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tekton_sli::{Cli, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    cli.run().await
}
