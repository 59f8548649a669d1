//! Failing-step reports for failed PipelineRuns

use tracing::{debug, info, warn};

use crate::config::QueryConfig;
use crate::logs::{LogFetcher, LogRequest};
use crate::model::{FailureReport, PipelineRunSummary, TaskRunSummary};
use crate::source::PipelineRunSource;
use crate::Result;

/// Build failure reports for `failed` runs, in the order given
///
/// Runs are looked up one at a time and step logs are fetched one at a time.
/// A run is skipped when its details are incomplete (for example a Pending run
/// whose task runs are not populated yet) or when the lookup itself fails. A run
/// whose task runs all exited cleanly produces no report.
pub async fn collect_failure_reports(
    source: &dyn PipelineRunSource,
    logs: &dyn LogFetcher,
    config: &QueryConfig,
    failed: &[PipelineRunSummary],
) -> Vec<FailureReport> {
    let mut reports = Vec::new();

    for run in failed {
        let task_runs = match failing_task_runs(source, &run.name).await {
            Ok(task_runs) => task_runs,
            Err(e) if e.is_missing_field() => {
                debug!(run = %run.name, error = %e, "incomplete PipelineRun details, skipping");
                continue;
            }
            Err(e) => {
                warn!(run = %run.name, error = %e, "failed to look up PipelineRun, skipping");
                continue;
            }
        };

        if task_runs.is_empty() {
            debug!(run = %run.name, "no failing steps found");
            continue;
        }

        let mut report = FailureReport {
            pipeline_run_name: run.name.clone(),
            created_at: run.created_at,
            task_runs,
        };
        attach_logs(logs, config, &mut report).await;
        reports.push(report);
    }

    info!(
        failed = failed.len(),
        reported = reports.len(),
        "collected failure reports"
    );
    reports
}

/// Task runs of `name` with at least one failing step, keeping only failing steps
async fn failing_task_runs(
    source: &dyn PipelineRunSource,
    name: &str,
) -> Result<Vec<TaskRunSummary>> {
    let run = source.get(name).await?;

    let mut task_runs = Vec::new();
    for (id, entry) in run.task_runs()? {
        let mut summary = TaskRunSummary::from_status(name, id, entry)?;
        if !summary.has_failures() {
            continue;
        }
        summary.steps.retain(|step| step.failed());
        task_runs.push(summary);
    }
    Ok(task_runs)
}

async fn attach_logs(logs: &dyn LogFetcher, config: &QueryConfig, report: &mut FailureReport) {
    for task_run in &mut report.task_runs {
        for step in &mut task_run.steps {
            let request = LogRequest::new(&task_run.pod_name, &step.container_name, &config.namespace)
                .with_context(config.context.clone())
                .with_env(config.log_env.clone());

            let text = match logs.fetch(&request).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        run = %report.pipeline_run_name,
                        pod = %task_run.pod_name,
                        container = %step.container_name,
                        error = %e,
                        "failed to retrieve step logs"
                    );
                    format!("failed to retrieve logs: {e}")
                }
            };
            step.logs = Some(text);
        }
    }
}
