//! `tekton-sli sli` - success ratio over the time window

use clap::Args;

use super::format::print_table;
use super::{to_structured, RunOptions};
use crate::model::SuccessRatio;
use crate::{QueryConfig, QuerySession, Result};

/// Arguments for the `sli` command
#[derive(Args, Debug)]
pub struct SliArgs {}

/// Print the success ratio with its run counts
pub async fn run(config: &QueryConfig, options: RunOptions, _args: SliArgs) -> Result<()> {
    let session = QuerySession::connect(config).await?;
    let snapshot = options.check(session.query().snapshot().await)?;
    let ratio = snapshot.success_ratio();

    match to_structured(&ratio, options.output)? {
        Some(text) => println!("{}", text.trim_end()),
        None => print_table(&["SUCCESS RATIO", "TOTAL", "FAILED", "WINDOW"], &[row(&ratio, config)]),
    }
    Ok(())
}

fn row(ratio: &SuccessRatio, config: &QueryConfig) -> Vec<String> {
    vec![
        format!("{:.1}", ratio.ratio),
        ratio.total_runs.to_string(),
        ratio.failed_runs.to_string(),
        config.window.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_shows_one_decimal() {
        let ratio = crate::query::success_ratio(3, 1);
        assert_eq!(row(&ratio, &QueryConfig::default()), vec!["0.7", "3", "1", "86400s"]);

        let empty = crate::query::success_ratio(0, 0);
        assert_eq!(row(&empty, &QueryConfig::default())[0], "0.0");
    }
}
