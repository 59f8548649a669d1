//! Success-ratio and run-count indicators
//!
//! Two shapes are offered as separate operations: [`success_ratio`] returns the
//! rounded ratio together with the counts, [`run_counts`] only the counts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lister::ListOutcome;
use super::window::TimeWindow;
use crate::model::{PipelineRunSummary, RunCounts, SuccessRatio};
use crate::{Error, Result};

/// Runs inside the time window, taken from a single listing
///
/// `failed` is derived from `total`, so it is always a subset of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    /// Every run inside the window, in listing order
    pub total: Vec<PipelineRunSummary>,
    /// Runs inside the window whose first condition is `False`
    pub failed: Vec<PipelineRunSummary>,
    /// Why the listing failed, if it did (both sequences are then empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

impl RunSnapshot {
    /// Window a listing and split out the failed runs
    pub fn from_outcome(outcome: ListOutcome, window: TimeWindow, now: DateTime<Utc>) -> Self {
        let (runs, unavailable) = match outcome {
            ListOutcome::Listed { runs } => (runs, None),
            ListOutcome::Unavailable { reason } => (Vec::new(), Some(reason)),
        };
        let total = window.retain(runs, now);
        let failed = total.iter().filter(|r| r.is_failed()).cloned().collect();
        Self {
            total,
            failed,
            unavailable,
        }
    }

    /// The snapshot, or an error when the listing failed
    pub fn into_result(mut self) -> Result<Self> {
        match self.unavailable.take() {
            Some(reason) => Err(Error::Unavailable(reason)),
            None => Ok(self),
        }
    }

    /// Counts of this snapshot
    pub fn counts(&self) -> RunCounts {
        run_counts(self.total.len(), self.failed.len())
    }

    /// Success ratio of this snapshot
    pub fn success_ratio(&self) -> SuccessRatio {
        success_ratio(self.total.len(), self.failed.len())
    }
}

/// Success ratio rounded to one decimal, with the counts it was computed from
///
/// Zero runs yields exactly `(0.0, 0, 0)`, the same as a 0% success rate.
/// Rounding works on the exact binary value of the ratio: 19 of 20 runs
/// succeeding is stored just below 0.95 and rounds to 0.9, while exact halves
/// such as 0.25 and 0.75 round to even.
pub fn success_ratio(total_runs: usize, failed_runs: usize) -> SuccessRatio {
    if total_runs == 0 {
        return SuccessRatio {
            ratio: 0.0,
            total_runs: 0,
            failed_runs: 0,
        };
    }

    let raw = 1.0 - failed_runs as f64 / total_runs as f64;
    SuccessRatio {
        ratio: round_one_decimal(raw).clamp(0.0, 1.0),
        total_runs,
        failed_runs,
    }
}

/// Run counts without a ratio
pub fn run_counts(total_runs: usize, failed_runs: usize) -> RunCounts {
    RunCounts {
        total_runs,
        failed_runs,
    }
}

// Decimal formatting rounds the exact binary value, not a rescaled product
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
