//! `tekton-sli runs` - list PipelineRuns with their status

use chrono::Utc;
use clap::Args;

use super::format::{format_age, print_table};
use super::{to_structured, RunOptions};
use crate::model::PipelineRunSummary;
use crate::query::RunSnapshot;
use crate::{QueryConfig, QuerySession, Result};

/// Arguments for the `runs` command
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Only show failed runs
    #[arg(long)]
    pub failed: bool,

    /// Ignore the time window and show every run in the namespace
    #[arg(long)]
    pub all: bool,
}

/// List runs in the window (or all runs), optionally only failed ones
pub async fn run(config: &QueryConfig, options: RunOptions, args: RunsArgs) -> Result<()> {
    let session = QuerySession::connect(config).await?;
    let query = session.query();

    let runs = if args.all {
        let outcome = if args.failed {
            query.failed_runs().await
        } else {
            query.list_runs().await
        };
        if options.strict {
            outcome.into_result()?
        } else {
            outcome.into_runs()
        }
    } else {
        let RunSnapshot { total, failed, .. } = options.check(query.snapshot().await)?;
        if args.failed {
            failed
        } else {
            total
        }
    };

    if let Some(text) = to_structured(&runs, options.output)? {
        println!("{}", text.trim_end());
        return Ok(());
    }

    if runs.is_empty() {
        println!("No PipelineRuns found.");
        return Ok(());
    }
    print_table(&["NAME", "STATUS", "CREATED", "AGE"], &rows(&runs));
    Ok(())
}

fn rows(runs: &[PipelineRunSummary]) -> Vec<Vec<String>> {
    let now = Utc::now();
    runs.iter()
        .map(|run| {
            vec![
                run.name.clone(),
                run.status.to_string(),
                run.created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                format_age(&run.created_at, now),
            ]
        })
        .collect()
}
