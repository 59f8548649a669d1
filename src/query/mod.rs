//! PipelineRun queries
//!
//! [`PipelineRunQuery`] ties the cluster and log collaborators to one
//! [`QueryConfig`]. Every operation lists runs once, applies the time window and
//! derives what it needs from that single snapshot. Calls are awaited one at a
//! time; nothing is spawned.

mod failures;
mod lister;
mod sli;
mod window;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

pub use failures::collect_failure_reports;
pub use lister::{list_runs, ListOutcome};
pub use sli::{run_counts, success_ratio, RunSnapshot};
pub use window::TimeWindow;

use crate::config::QueryConfig;
use crate::logs::LogFetcher;
use crate::model::{FailureReport, PipelineRunSummary, RunCounts, SuccessRatio};
use crate::report::render_reports;
use crate::source::PipelineRunSource;
use crate::Result;

/// Queries PipelineRuns in one namespace
#[derive(Clone)]
pub struct PipelineRunQuery {
    source: Arc<dyn PipelineRunSource>,
    logs: Arc<dyn LogFetcher>,
    config: QueryConfig,
}

impl PipelineRunQuery {
    /// Create a query over the given collaborators
    pub fn new(
        source: Arc<dyn PipelineRunSource>,
        logs: Arc<dyn LogFetcher>,
        config: QueryConfig,
    ) -> Self {
        Self {
            source,
            logs,
            config,
        }
    }

    /// Configuration this query runs with
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// All PipelineRuns in the namespace, in API order, without windowing
    pub async fn list_runs(&self) -> ListOutcome {
        list_runs(self.source.as_ref(), &self.config.list_params()).await
    }

    /// PipelineRuns whose first condition is `False`, without windowing
    pub async fn failed_runs(&self) -> ListOutcome {
        self.list_runs().await.filter(|run| run.is_failed())
    }

    /// Runs inside the time window ending now
    pub async fn snapshot(&self) -> RunSnapshot {
        self.snapshot_at(Utc::now()).await
    }

    /// Runs inside the time window ending at `now`
    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> RunSnapshot {
        let snapshot = RunSnapshot::from_outcome(self.list_runs().await, self.config.window, now);
        info!(
            namespace = %self.config.namespace,
            window = %self.config.window,
            total = snapshot.total.len(),
            failed = snapshot.failed.len(),
            "windowed PipelineRuns"
        );
        snapshot
    }

    /// Success ratio over the time window ending now
    pub async fn success_ratio(&self) -> SuccessRatio {
        self.snapshot().await.success_ratio()
    }

    /// Run counts over the time window ending now
    pub async fn run_counts(&self) -> RunCounts {
        self.snapshot().await.counts()
    }

    /// Failure reports for failed runs inside the time window ending now
    pub async fn failure_reports(&self) -> Vec<FailureReport> {
        self.failure_reports_at(Utc::now()).await
    }

    /// Failure reports for failed runs inside the time window ending at `now`
    pub async fn failure_reports_at(&self, now: DateTime<Utc>) -> Vec<FailureReport> {
        let snapshot = self.snapshot_at(now).await;
        self.reports_for(&snapshot.failed).await
    }

    /// Failure reports for an already selected set of failed runs
    pub async fn reports_for(&self, failed: &[PipelineRunSummary]) -> Vec<FailureReport> {
        collect_failure_reports(self.source.as_ref(), self.logs.as_ref(), &self.config, failed)
            .await
    }

    /// Failure reports for the time window ending now, rendered as text
    pub async fn render_failure_report(&self) -> Result<String> {
        render_reports(&self.failure_reports().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MockLogFetcher;
    use crate::source::MockPipelineRunSource;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn run(name: &str, status: &str, created: &str) -> crate::crd::PipelineRun {
        serde_json::from_value(json!({
            "metadata": {"name": name, "creationTimestamp": created},
            "status": {
                "conditions": [{"type": "Succeeded", "status": status}],
                "taskRuns": {
                    format!("{name}-test"): {
                        "pipelineTaskName": "test",
                        "status": {
                            "podName": format!("{name}-pod"),
                            "steps": [{"name": "unit", "container": "step-unit",
                                       "terminated": {"exitCode": 1}}]
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn query(source: MockPipelineRunSource, logs: MockLogFetcher, window: u64) -> PipelineRunQuery {
        PipelineRunQuery::new(
            Arc::new(source),
            Arc::new(logs),
            QueryConfig::default().with_window(TimeWindow::from_secs(window)),
        )
    }

    /// Story: yesterday's SLI counts only yesterday's runs, from one listing
    #[tokio::test]
    async fn story_snapshot_lists_once_and_windows_both_sets() {
        let mut source = MockPipelineRunSource::new();
        source.expect_list().times(1).returning(|_| {
            Ok(vec![
                run("a", "True", "2024-06-01T10:00:00Z"),
                run("b", "False", "2024-06-01T09:00:00Z"),
                run("c", "True", "2024-06-01T08:00:00Z"),
                run("old", "False", "2024-05-20T08:00:00Z"),
            ])
        });

        let snapshot = query(source, MockLogFetcher::new(), 86400)
            .snapshot_at(now())
            .await;
        let ratio = snapshot.success_ratio();
        assert_eq!((ratio.ratio, ratio.total_runs, ratio.failed_runs), (0.7, 3, 1));
    }

    #[tokio::test]
    async fn failed_runs_ignores_the_window() {
        let mut source = MockPipelineRunSource::new();
        source.expect_list().returning(|_| {
            Ok(vec![
                run("a", "True", "2024-06-01T10:00:00Z"),
                run("old", "False", "2020-01-01T00:00:00Z"),
            ])
        });

        let failed = query(source, MockLogFetcher::new(), 0)
            .failed_runs()
            .await
            .into_runs();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "old");
    }

    #[tokio::test]
    async fn failure_reports_cover_only_windowed_failures() {
        let mut source = MockPipelineRunSource::new();
        source.expect_list().times(1).returning(|_| {
            Ok(vec![
                run("recent", "False", "2024-06-01T11:00:00Z"),
                run("old", "False", "2024-01-01T00:00:00Z"),
            ])
        });
        source
            .expect_get()
            .withf(|name| name == "recent")
            .times(1)
            .returning(|name| Ok(run(name, "False", "2024-06-01T11:00:00Z")));

        let mut logs = MockLogFetcher::new();
        logs.expect_fetch()
            .times(1)
            .returning(|_| Ok("assertion failed".to_string()));

        let reports = query(source, logs, 3600).failure_reports_at(now()).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].pipeline_run_name, "recent");
    }

    #[tokio::test]
    async fn zero_window_reports_nothing() {
        let mut source = MockPipelineRunSource::new();
        source
            .expect_list()
            .returning(|_| Ok(vec![run("a", "False", "2024-06-01T11:59:59Z")]));
        source.expect_get().never();

        let q = query(source, MockLogFetcher::new(), 0);
        assert!(q.failure_reports_at(now()).await.is_empty());
        assert_eq!(q.snapshot_at(now()).await.counts(), run_counts(0, 0));
    }
}
