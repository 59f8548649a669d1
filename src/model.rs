//! Read-only projections of PipelineRun state
//!
//! Every value here is built once from a single API response and never mutated.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crd::{ConditionStatus, PipelineRun, PipelineRunTaskRunStatus};
use crate::{Error, Result};

/// A PipelineRun reduced to what the SLI needs
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSummary {
    /// Resource name
    pub name: String,
    /// Status of the first condition
    pub status: ConditionStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PipelineRunSummary {
    /// Project a PipelineRun into a summary
    ///
    /// Returns `None` when the object has no name or creation timestamp.
    pub fn from_run(run: &PipelineRun) -> Option<Self> {
        Some(Self {
            name: run.name()?.to_string(),
            status: run.first_condition_status(),
            created_at: run.created_at()?,
        })
    }

    /// Whether the run failed
    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }
}

/// A terminated step of a task run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStepResult {
    /// Step name
    pub step_name: String,
    /// Container running the step
    pub container_name: String,
    /// Exit code of the step container
    pub exit_code: i32,
    /// Container logs, filled in once fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl TaskStepResult {
    /// Whether the step exited non-zero
    pub fn failed(&self) -> bool {
        self.exit_code != 0
    }
}

/// A task run and its terminated steps
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSummary {
    /// Name of the task within the pipeline
    pub task_name: String,
    /// Pod backing the task run
    pub pod_name: String,
    /// Terminated steps in declaration order
    pub steps: Vec<TaskStepResult>,
}

impl TaskRunSummary {
    /// Project an embedded task-run entry
    ///
    /// Steps still waiting or running are left out since they have no exit code.
    pub fn from_status(
        run_name: &str,
        task_run_id: &str,
        entry: &PipelineRunTaskRunStatus,
    ) -> Result<Self> {
        let resource = format!("{run_name}/{task_run_id}");
        let task_name = entry
            .pipeline_task_name
            .clone()
            .ok_or_else(|| Error::missing_field(&resource, "pipelineTaskName"))?;
        let status = entry
            .status
            .as_ref()
            .ok_or_else(|| Error::missing_field(&resource, "status"))?;
        let pod_name = status
            .pod_name
            .clone()
            .ok_or_else(|| Error::missing_field(&resource, "status.podName"))?;
        let steps = status
            .steps
            .as_ref()
            .ok_or_else(|| Error::missing_field(&resource, "status.steps"))?;

        let steps = steps
            .iter()
            .filter_map(|step| {
                let exit_code = step.exit_code()?;
                Some(TaskStepResult {
                    step_name: step.name.clone().unwrap_or_default(),
                    container_name: step.container.clone().unwrap_or_default(),
                    exit_code,
                    logs: None,
                })
            })
            .collect();

        Ok(Self {
            task_name,
            pod_name,
            steps,
        })
    }

    /// Steps that exited non-zero
    pub fn failing_steps(&self) -> impl Iterator<Item = &TaskStepResult> {
        self.steps.iter().filter(|s| s.failed())
    }

    /// Whether at least one step exited non-zero
    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(TaskStepResult::failed)
    }
}

/// Failure details for one failed PipelineRun
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Name of the failed PipelineRun
    pub pipeline_run_name: String,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    /// Task runs with at least one failing step; only failing steps are kept
    pub task_runs: Vec<TaskRunSummary>,
}

/// Success ratio over a time window, with the counts it came from
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRatio {
    /// Fraction of successful runs, rounded to one decimal
    pub ratio: f64,
    /// Runs in the window
    pub total_runs: usize,
    /// Failed runs in the window
    pub failed_runs: usize,
}

/// Run counts over a time window, without a ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    /// Runs in the window
    pub total_runs: usize,
    /// Failed runs in the window
    pub failed_runs: usize,
}
