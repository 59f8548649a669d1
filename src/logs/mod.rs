//! Container log retrieval
//!
//! Failure reports attach the log of every failing step. Two fetchers exist:
//! - [`KubectlLogFetcher`] shells out to `kubectl logs`, honouring the session's
//!   kubeconfig, the cluster context and caller-supplied environment overrides
//! - [`ApiLogFetcher`] reads the pod log subresource through the kube client
//!
//! Both return [`CONTAINERS_EXITED`](crate::CONTAINERS_EXITED) instead of an error
//! when the container is gone and its logs can no longer be read.

mod api;
mod kubectl;

use std::collections::BTreeMap;

use async_trait::async_trait;
use clap::ValueEnum;
#[cfg(test)]
use mockall::automock;

pub use api::ApiLogFetcher;
pub use kubectl::{CommandOutput, CommandRunner, KubectlLogFetcher, TokioCommandRunner};

use crate::Result;

/// Which log fetcher a session uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogSource {
    /// `kubectl logs`
    #[default]
    Kubectl,
    /// Kubernetes API pod log subresource
    Api,
}

/// Identifies one container's logs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogRequest {
    /// Pod name
    pub pod: String,
    /// Container name within the pod
    pub container: String,
    /// Namespace of the pod
    pub namespace: String,
    /// Kubeconfig context to use, if not the current one
    pub context: Option<String>,
    /// Environment overrides for command-based fetchers
    pub env: BTreeMap<String, String>,
}

impl LogRequest {
    /// Create a request for a container's logs
    pub fn new(
        pod: impl Into<String>,
        container: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            pod: pod.into(),
            container: container.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Target a specific kubeconfig context
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Add environment overrides
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// Fetches the full log text of a container
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogFetcher: Send + Sync {
    /// Return the container's log text, or the "Containers Exited" placeholder
    /// when the container has terminated and its logs are unavailable
    async fn fetch(&self, request: &LogRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_every_field() {
        let mut env = BTreeMap::new();
        env.insert("HTTPS_PROXY".to_string(), "http://proxy:3128".to_string());

        let request = LogRequest::new("pod-a", "step-build", "jx")
            .with_context(Some("sandbox-cluster-1".to_string()))
            .with_env(env.clone());

        assert_eq!(request.pod, "pod-a");
        assert_eq!(request.container, "step-build");
        assert_eq!(request.namespace, "jx");
        assert_eq!(request.context.as_deref(), Some("sandbox-cluster-1"));
        assert_eq!(request.env, env);
    }

    #[test]
    fn kubectl_is_the_default_source() {
        assert_eq!(LogSource::default(), LogSource::Kubectl);
    }
}
