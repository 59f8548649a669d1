//! Fail-soft PipelineRun listing

use kube::api::ListParams;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::PipelineRunSummary;
use crate::source::PipelineRunSource;
use crate::{Error, Result};

/// Result of listing PipelineRuns
///
/// Listing never fails outright. When the API cannot be read the outcome is
/// `Unavailable`, which callers may treat as "no runs" ([`into_runs`]) or as an
/// error ([`into_result`]).
///
/// [`into_runs`]: ListOutcome::into_runs
/// [`into_result`]: ListOutcome::into_result
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ListOutcome {
    /// The listing succeeded
    Listed {
        /// Runs in API order
        runs: Vec<PipelineRunSummary>,
    },
    /// The listing failed; there is no data
    Unavailable {
        /// Why the API could not be read
        reason: String,
    },
}

impl ListOutcome {
    /// Runs, or an empty list when the listing failed
    pub fn into_runs(self) -> Vec<PipelineRunSummary> {
        match self {
            Self::Listed { runs } => runs,
            Self::Unavailable { .. } => Vec::new(),
        }
    }

    /// Runs, or an error when the listing failed
    pub fn into_result(self) -> Result<Vec<PipelineRunSummary>> {
        match self {
            Self::Listed { runs } => Ok(runs),
            Self::Unavailable { reason } => Err(Error::Unavailable(reason)),
        }
    }

    /// Whether the listing failed
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Keep only the runs matching `predicate`
    pub fn filter(self, predicate: impl Fn(&PipelineRunSummary) -> bool) -> Self {
        match self {
            Self::Listed { runs } => Self::Listed {
                runs: runs.into_iter().filter(|r| predicate(r)).collect(),
            },
            unavailable => unavailable,
        }
    }
}

/// List PipelineRuns and project them into summaries
///
/// Items without a name or creation timestamp are dropped.
pub async fn list_runs(source: &dyn PipelineRunSource, params: &ListParams) -> ListOutcome {
    match source.list(params).await {
        Ok(runs) => {
            let total = runs.len();
            let summaries: Vec<PipelineRunSummary> = runs
                .iter()
                .filter_map(|run| {
                    let summary = PipelineRunSummary::from_run(run);
                    if summary.is_none() {
                        warn!(
                            name = run.name().unwrap_or("<unnamed>"),
                            "PipelineRun has no name or creation timestamp, skipping"
                        );
                    }
                    summary
                })
                .collect();
            debug!(listed = total, kept = summaries.len(), "projected PipelineRuns");
            ListOutcome::Listed { runs: summaries }
        }
        Err(e) => {
            warn!(error = %e, "failed to list PipelineRuns, reporting no data");
            ListOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
