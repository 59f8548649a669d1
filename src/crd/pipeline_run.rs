//! Tekton PipelineRun wire types
//!
//! Only the status fields read by the SLI and failure reports are modelled:
//! the conditions, and (for the detail lookup) the embedded task-run map with
//! per-step termination state. Newer Tekton versions replace the embedded map
//! with `childReferences`; such runs have no `taskRuns` and read as missing data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ConditionStatus};
use crate::{Error, Result};

/// A Tekton PipelineRun as read from the API server
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PipelineRun {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Status written by the Tekton controller (absent on brand-new runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineRunStatus>,
}

/// Observed state of a PipelineRun
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    /// Conditions; Tekton keeps a single "Succeeded" condition at index 0
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// When the run started executing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// When the run finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    /// Embedded task-run status keyed by task-run name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_runs: Option<BTreeMap<String, PipelineRunTaskRunStatus>>,
}

/// Entry of the embedded task-run map
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunTaskRunStatus {
    /// Name of the task within the pipeline definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_task_name: Option<String>,

    /// Status of the task run itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskRunStatus>,
}

/// Observed state of a TaskRun
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    /// Pod backing the task run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,

    /// Per-step container state, in step order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepState>>,
}

/// State of a single step container
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    /// Step name as declared in the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Container running the step (usually `step-<name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Termination details; absent while the step is waiting or running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<TerminatedState>,
}

/// Terminated container state
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminatedState {
    /// Exit code of the container
    #[serde(default)]
    pub exit_code: i32,

    /// Reason for termination (e.g. "Completed", "Error")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PipelineRun {
    /// Build the `ApiResource` for PipelineRuns at the given Tekton API version
    pub fn api_resource(version: &str) -> ApiResource {
        ApiResource {
            group: crate::TEKTON_GROUP.to_string(),
            version: version.to_string(),
            api_version: format!("{}/{}", crate::TEKTON_GROUP, version),
            kind: crate::PIPELINE_RUN_KIND.to_string(),
            plural: crate::PIPELINE_RUN_PLURAL.to_string(),
        }
    }

    /// Convert an untyped API object into a PipelineRun
    pub fn from_dynamic(obj: &DynamicObject) -> Result<Self> {
        let value = serde_json::to_value(obj)?;
        serde_json::from_value(value).map_err(|e| {
            let name = obj.metadata.name.as_deref().unwrap_or("<unnamed>");
            Error::serialization(format!("PipelineRun {name}: {e}"))
        })
    }

    /// Resource name, if set
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Creation timestamp, if set
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.creation_timestamp.as_ref().map(|t| t.0)
    }

    /// Status of the first condition; no conditions reads as `Unknown`
    ///
    /// Later conditions are never consulted.
    pub fn first_condition_status(&self) -> ConditionStatus {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.first())
            .map(|c| c.status)
            .unwrap_or_default()
    }

    /// The embedded task-run map
    ///
    /// Fails with [`Error::MissingField`] when the run has no status or the
    /// controller has not populated the map (e.g. a run that is still Pending).
    pub fn task_runs(&self) -> Result<&BTreeMap<String, PipelineRunTaskRunStatus>> {
        let name = self.name().unwrap_or("<unnamed>");
        self.status
            .as_ref()
            .ok_or_else(|| Error::missing_field(name, "status"))?
            .task_runs
            .as_ref()
            .ok_or_else(|| Error::missing_field(name, "status.taskRuns"))
    }
}

impl StepState {
    /// Exit code if the step has terminated
    pub fn exit_code(&self) -> Option<i32> {
        self.terminated.as_ref().map(|t| t.exit_code)
    }

    /// Whether the step terminated with a non-zero exit code
    pub fn failed(&self) -> bool {
        self.exit_code().is_some_and(|code| code != 0)
    }
}
