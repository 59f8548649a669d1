//! tekton-sli - Tekton PipelineRun health indicators for runbooks
//!
//! Queries Tekton `PipelineRun` resources in a namespace, computes a success-rate
//! SLI over a time window, and assembles text reports for failed runs that include
//! the logs of every failing step.
//!
//! # Flow
//!
//! 1. Build an immutable [`QueryConfig`] (validated before any network call)
//! 2. Open a [`QuerySession`] (materializes secret kubeconfigs, builds the client)
//! 3. List runs once, apply the time window, derive the failed subset
//! 4. For failed runs, look up task runs and steps, fetch logs for failing steps
//! 5. Render the reports
//!
//! Listing and reporting are fail-soft: API failures degrade to "no data" instead
//! of aborting the runbook.
//!
//! # Modules
//!
//! - [`config`] - Query configuration and time-window parsing
//! - [`kubeconfig`] - Credential sources and scoped kubeconfig materialization
//! - [`crd`] - Tekton PipelineRun wire types
//! - [`model`] - Read-only projections (summaries, failure reports)
//! - [`source`] - Cluster API collaborator for PipelineRuns
//! - [`logs`] - Container log retrieval collaborator
//! - [`query`] - Listing, filtering, SLI and failure reporting
//! - [`report`] - Failure report rendering
//! - [`session`] - Per-unit-of-work client and credential scope
//! - [`commands`] - CLI subcommands
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod commands;
pub mod config;
pub mod crd;
pub mod error;
pub mod kubeconfig;
pub mod logs;
pub mod model;
pub mod query;
pub mod report;
pub mod session;
pub mod source;

pub use config::QueryConfig;
pub use error::Error;
pub use query::{PipelineRunQuery, TimeWindow};
pub use session::QuerySession;

use clap::{Parser, Subcommand};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// API group of Tekton resources
pub const TEKTON_GROUP: &str = "tekton.dev";

/// Kind of the resource this crate reports on
pub const PIPELINE_RUN_KIND: &str = "PipelineRun";

/// Plural resource name used in API paths
pub const PIPELINE_RUN_PLURAL: &str = "pipelineruns";

/// Default Tekton API version
pub const DEFAULT_TEKTON_VERSION: &str = "v1beta1";

/// Default namespace holding the PipelineRuns
pub const DEFAULT_NAMESPACE: &str = "jx";

/// Default kubeconfig context
pub const DEFAULT_CONTEXT: &str = "sandbox-cluster-1";

/// Default time window in seconds (one day)
pub const DEFAULT_TIME_INTERVAL_SECS: u64 = 86400;

/// Default time window as accepted on the command line
pub const DEFAULT_TIME_INTERVAL: &str = "86400";

/// Default deadline for a single API request or log fetch, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Log text used when a container has exited and its logs are gone
pub const CONTAINERS_EXITED: &str = "Containers Exited";

/// tekton-sli - Tekton PipelineRun success rate and failure reports
#[derive(Parser, Debug)]
#[command(name = "tekton-sli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connection and query settings shared by every command
    #[command(flatten)]
    pub query: commands::QueryArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Success ratio, total and failed runs within the time window
    Sli(commands::sli::SliArgs),
    /// Total and failed runs within the time window (no ratio)
    Counts(commands::counts::CountsArgs),
    /// List PipelineRuns with their status
    Runs(commands::runs::RunsArgs),
    /// Report failing steps of failed runs, with their logs
    Failures(commands::failures::FailuresArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        // Validate before touching the cluster: a bad interval is fatal
        let config = QueryConfig::try_from(&self.query)?;
        let options = self.query.run_options();
        match self.command {
            Commands::Sli(args) => commands::sli::run(&config, options, args).await,
            Commands::Counts(args) => commands::counts::run(&config, options, args).await,
            Commands::Runs(args) => commands::runs::run(&config, options, args).await,
            Commands::Failures(args) => commands::failures::run(&config, options, args).await,
        }
    }
}
