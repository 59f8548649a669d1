//! Cluster API collaborator for PipelineRuns
//!
//! Tekton's types are not compiled into this crate, so runs are read as
//! `DynamicObject`s through an `ApiResource` built for the configured API
//! version and then deserialized into [`PipelineRun`].

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams};
use kube::Client;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::crd::PipelineRun;
use crate::Result;

/// Read access to PipelineRuns in one namespace
///
/// Abstracted so the query logic can be tested without a cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PipelineRunSource: Send + Sync {
    /// List PipelineRuns matching the given options, in API order
    async fn list(&self, params: &ListParams) -> Result<Vec<PipelineRun>>;

    /// Fetch a single PipelineRun by name
    async fn get(&self, name: &str) -> Result<PipelineRun>;
}

/// PipelineRun source backed by the Kubernetes API
pub struct KubePipelineRunSource {
    api: Api<DynamicObject>,
    namespace: String,
}

impl KubePipelineRunSource {
    /// Create a source for `namespace` at the given Tekton API version
    pub fn new(client: Client, namespace: &str, tekton_version: &str) -> Self {
        let ar = PipelineRun::api_resource(tekton_version);
        Self {
            api: Api::namespaced_with(client, namespace, &ar),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl PipelineRunSource for KubePipelineRunSource {
    async fn list(&self, params: &ListParams) -> Result<Vec<PipelineRun>> {
        let list = self.api.list(params).await?;
        debug!(
            namespace = %self.namespace,
            count = list.items.len(),
            "listed PipelineRuns"
        );

        // A single malformed object should not hide every other run
        let runs = list
            .items
            .iter()
            .filter_map(|obj| match PipelineRun::from_dynamic(obj) {
                Ok(run) => Some(run),
                Err(e) => {
                    warn!(namespace = %self.namespace, error = %e, "skipping unreadable PipelineRun");
                    None
                }
            })
            .collect();
        Ok(runs)
    }

    async fn get(&self, name: &str) -> Result<PipelineRun> {
        let obj = self.api.get(name).await?;
        PipelineRun::from_dynamic(&obj)
    }
}
