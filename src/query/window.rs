//! Time-window filtering

use chrono::{DateTime, Duration, Utc};

use crate::model::PipelineRunSummary;
use crate::{Error, Result};

/// A look-back window ending at "now"
///
/// A run is inside the window when it was created at or after `now - window`.
/// A zero-length window contains nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    seconds: u64,
}

impl TimeWindow {
    /// Create a window of `seconds`
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Parse a window from a decimal seconds string (e.g. "86400")
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        trimmed.parse::<u64>().map(Self::from_secs).map_err(|_| {
            Error::validation(format!(
                "time interval '{s}' must be a non-negative integer number of seconds"
            ))
        })
    }

    /// Window length in seconds
    pub fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Oldest creation time still inside the window
    ///
    /// `None` when the window reaches past the representable time range, in
    /// which case every run is inside it.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.seconds).ok()?;
        let span = Duration::try_seconds(secs)?;
        now.checked_sub_signed(span)
    }

    /// Whether a run created at `created_at` falls inside the window
    pub fn contains(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.seconds == 0 {
            return false;
        }
        match self.cutoff(now) {
            Some(cutoff) => created_at >= cutoff,
            None => true,
        }
    }

    /// Keep the runs inside the window, preserving order
    pub fn retain(
        &self,
        runs: Vec<PipelineRunSummary>,
        now: DateTime<Utc>,
    ) -> Vec<PipelineRunSummary> {
        runs.into_iter()
            .filter(|run| self.contains(run.created_at, now))
            .collect()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ConditionStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn run(name: &str, age_secs: i64) -> PipelineRunSummary {
        PipelineRunSummary {
            name: name.to_string(),
            status: ConditionStatus::True,
            created_at: now() - Duration::seconds(age_secs),
        }
    }

    fn names(runs: &[PipelineRunSummary]) -> Vec<&str> {
        runs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn parse_accepts_decimal_seconds() {
        assert_eq!(TimeWindow::parse("86400").unwrap().as_secs(), 86400);
        assert_eq!(TimeWindow::parse(" 3600 ").unwrap().as_secs(), 3600);
        assert_eq!(TimeWindow::parse("0").unwrap().as_secs(), 0);
    }

    #[test]
    fn parse_rejects_non_numeric_and_negative() {
        for bad in ["", "1h", "one day", "-5", "3.5", "86400s"] {
            let err = TimeWindow::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::Validation(_)),
                "expected validation error for {bad:?}"
            );
        }
    }

    #[test]
    fn zero_window_is_empty() {
        let runs = vec![run("now", 0), run("old", 10), run("future", -5)];
        assert!(TimeWindow::from_secs(0).retain(runs, now()).is_empty());
    }

    #[test]
    fn huge_window_keeps_everything() {
        let runs = vec![run("a", 0), run("b", 10_000_000), run("c", 1)];
        let kept = TimeWindow::from_secs(u64::MAX).retain(runs.clone(), now());
        assert_eq!(kept, runs);
    }

    #[test]
    fn window_keeps_runs_at_or_after_cutoff() {
        let runs = vec![
            run("inside", 3599),
            run("boundary", 3600),
            run("outside", 3601),
        ];
        let kept = TimeWindow::from_secs(3600).retain(runs, now());
        assert_eq!(names(&kept), vec!["inside", "boundary"]);
    }

    #[test]
    fn window_preserves_listing_order() {
        let runs = vec![run("z", 5), run("a", 50), run("m", 500)];
        let kept = TimeWindow::from_secs(1000).retain(runs, now());
        assert_eq!(names(&kept), vec!["z", "a", "m"]);
    }

    #[test]
    fn cutoff_is_now_minus_window() {
        let cutoff = TimeWindow::from_secs(60).cutoff(now()).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 6, 1, 11, 59, 0).unwrap());
        assert!(TimeWindow::from_secs(u64::MAX).cutoff(now()).is_none());
    }

    #[test]
    fn display_shows_seconds() {
        assert_eq!(TimeWindow::from_secs(86400).to_string(), "86400s");
    }
}
