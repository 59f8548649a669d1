//! Supporting types shared by Tekton resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condition status following Kubernetes conventions
///
/// Anything other than `True` or `False` (including values added by future
/// Tekton releases) reads as `Unknown`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    /// Condition is true (the run succeeded)
    True,
    /// Condition is false (the run failed)
    False,
    /// Condition status is unknown (the run is still going, or never started)
    #[default]
    #[serde(other)]
    Unknown,
}

impl ConditionStatus {
    /// Whether this status marks a failed run
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::False)
    }
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::str::FromStr for ConditionStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "True" => Ok(Self::True),
            "False" => Ok(Self::False),
            "Unknown" => Ok(Self::Unknown),
            _ => Err(crate::Error::validation(format!(
                "invalid condition status: {s}, expected one of: True, False, Unknown"
            ))),
        }
    }
}

/// Kubernetes-style condition as written by the Tekton controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (Tekton uses "Succeeded")
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    #[serde(default)]
    pub status: ConditionStatus,

    /// Machine-readable reason (e.g. "Failed", "Running", "PipelineRunTimeout")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}
