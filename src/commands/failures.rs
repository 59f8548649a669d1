//! `tekton-sli failures` - failing steps of failed runs, with their logs

use clap::Args;

use super::{to_structured, RunOptions};
use crate::report::render_reports;
use crate::{QueryConfig, QuerySession, Result};

/// Arguments for the `failures` command
#[derive(Args, Debug)]
pub struct FailuresArgs {}

/// Print failure reports for failed runs inside the window
pub async fn run(config: &QueryConfig, options: RunOptions, _args: FailuresArgs) -> Result<()> {
    let session = QuerySession::connect(config).await?;
    let query = session.query();
    let snapshot = options.check(query.snapshot().await)?;
    let reports = query.reports_for(&snapshot.failed).await;

    if let Some(text) = to_structured(&reports, options.output)? {
        println!("{}", text.trim_end());
        return Ok(());
    }

    if reports.is_empty() {
        println!("No failing steps in the last {}.", config.window);
        return Ok(());
    }
    print!("{}", render_reports(&reports)?);
    Ok(())
}
