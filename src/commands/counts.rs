//! `tekton-sli counts` - total and failed runs over the time window

use clap::Args;

use super::format::print_table;
use super::{to_structured, RunOptions};
use crate::{QueryConfig, QuerySession, Result};

/// Arguments for the `counts` command
#[derive(Args, Debug)]
pub struct CountsArgs {}

/// Print total and failed run counts
pub async fn run(config: &QueryConfig, options: RunOptions, _args: CountsArgs) -> Result<()> {
    let session = QuerySession::connect(config).await?;
    let counts = options.check(session.query().snapshot().await)?.counts();

    match to_structured(&counts, options.output)? {
        Some(text) => println!("{}", text.trim_end()),
        None => print_table(
            &["TOTAL", "FAILED", "WINDOW"],
            &[vec![
                counts.total_runs.to_string(),
                counts.failed_runs.to_string(),
                config.window.to_string(),
            ]],
        ),
    }
    Ok(())
}
