//! Error types for Tekton PipelineRun queries
//!
//! Listing and reporting are fail-soft and never return these errors to their
//! callers. What remains are configuration problems (caught before any network
//! call), credential loading failures, and the internal signals the reporter
//! uses to decide which runs to skip.

use thiserror::Error;

/// Main error type for tekton-sli operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration value (time interval, selectors, env overrides)
    #[error("validation error: {0}")]
    Validation(String),

    /// Kubeconfig could not be loaded, materialized, or turned into a client
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// A field required to build a report is absent from the resource
    #[error("{resource} is missing field {field}")]
    MissingField {
        /// Name of the resource being inspected
        resource: String,
        /// Dotted path of the absent field (e.g. "status.taskRuns")
        field: String,
    },

    /// PipelineRuns could not be listed (strict handling of a fail-soft listing)
    #[error("pipeline runs unavailable: {0}")]
    Unavailable(String),

    /// Container log retrieval failed
    #[error("log retrieval failed for {pod}/{container}: {message}")]
    LogRetrieval {
        /// Pod the logs were requested from
        pod: String,
        /// Container within the pod
        container: String,
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Report template error
    #[error("template error: {0}")]
    Template(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a kubeconfig error with the given message
    pub fn kubeconfig(msg: impl Into<String>) -> Self {
        Self::Kubeconfig(msg.into())
    }

    /// Create a missing-field error for a resource
    pub fn missing_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            resource: resource.into(),
            field: field.into(),
        }
    }

    /// Create a log retrieval error for a pod container
    pub fn log_retrieval(
        pod: impl Into<String>,
        container: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::LogRetrieval {
            pod: pod.into(),
            container: container.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether this error means the resource lacks data rather than the API failing
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<minijinja::Error> for Error {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}
