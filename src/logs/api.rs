//! Pod log subresource based log retrieval

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, LogParams};
use kube::Client;
use tokio::time::timeout;
use tracing::debug;

use super::{LogFetcher, LogRequest};
use crate::{Error, Result, CONTAINERS_EXITED};

/// Log fetcher that reads logs through the Kubernetes API
///
/// The client is already bound to a context, so `LogRequest::context` and
/// `LogRequest::env` do not apply here.
pub struct ApiLogFetcher {
    client: Client,
    timeout: Duration,
}

impl ApiLogFetcher {
    /// Create a fetcher using `client`
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// Whether an API error means the container's logs are gone
fn is_exited_container_error(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 400 || ae.code == 404)
}

#[async_trait]
impl LogFetcher for ApiLogFetcher {
    async fn fetch(&self, request: &LogRequest) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &request.namespace);
        let params = LogParams {
            container: Some(request.container.clone()),
            ..LogParams::default()
        };

        let result = timeout(self.timeout, pods.logs(&request.pod, &params))
            .await
            .map_err(|_| {
                Error::log_retrieval(
                    &request.pod,
                    &request.container,
                    format!("log request timed out after {:?}", self.timeout),
                )
            })?;

        match result {
            Ok(logs) => Ok(logs),
            Err(e) if is_exited_container_error(&e) => {
                debug!(
                    pod = %request.pod,
                    container = %request.container,
                    error = %e,
                    "logs unavailable, container has exited"
                );
                Ok(CONTAINERS_EXITED.to_string())
            }
            Err(e) => Err(Error::log_retrieval(
                &request.pod,
                &request.container,
                e.to_string(),
            )),
        }
    }
}
