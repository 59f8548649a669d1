//! Tekton resource types
//!
//! Tekton's CRDs are owned by the Tekton installation, not by this crate, so the
//! types here only model the fields the queries read. Everything else in the
//! resource is ignored on deserialization.

mod pipeline_run;
mod types;

pub use pipeline_run::{
    PipelineRun, PipelineRunStatus, PipelineRunTaskRunStatus, StepState, TaskRunStatus,
    TerminatedState,
};
pub use types::{Condition, ConditionStatus};
