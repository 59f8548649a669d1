//! Per-unit-of-work query session
//!
//! A [`QuerySession`] owns everything a batch of queries needs: the kube client,
//! the log fetcher and, for secret-backed credentials, the temporary kubeconfig
//! file. The file exists from [`QuerySession::connect`] until the session is
//! dropped, whichever way the caller exits.

use std::sync::Arc;

use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tracing::{debug, info};

use crate::config::QueryConfig;
use crate::kubeconfig::MaterializedKubeconfig;
use crate::logs::{ApiLogFetcher, KubectlLogFetcher, LogFetcher, LogSource};
use crate::query::PipelineRunQuery;
use crate::source::KubePipelineRunSource;
use crate::{Error, Result};

/// Connected queries plus the credentials they run with
pub struct QuerySession {
    query: PipelineRunQuery,
    // Dropped after `query` so the kubeconfig outlives every fetcher using it
    kubeconfig: MaterializedKubeconfig,
}

impl QuerySession {
    /// Materialize credentials and build the cluster client
    ///
    /// Fails with [`Error::Kubeconfig`] when the kubeconfig cannot be read or the
    /// client cannot be built. No request is sent to the cluster here.
    pub async fn connect(config: &QueryConfig) -> Result<Self> {
        let kubeconfig = config.kubeconfig.materialize()?;
        let client = build_client(config, &kubeconfig).await?;

        let source = KubePipelineRunSource::new(
            client.clone(),
            &config.namespace,
            &config.tekton_version,
        );
        let logs: Arc<dyn LogFetcher> = match config.log_source {
            LogSource::Kubectl => Arc::new(KubectlLogFetcher::new(
                kubeconfig.path().map(|p| p.to_path_buf()),
                config.request_timeout,
            )),
            LogSource::Api => Arc::new(ApiLogFetcher::new(client, config.request_timeout)),
        };

        info!(
            namespace = %config.namespace,
            context = config.context.as_deref().unwrap_or("<current>"),
            tekton_version = %config.tekton_version,
            "connected query session"
        );

        Ok(Self {
            query: PipelineRunQuery::new(Arc::new(source), logs, config.clone()),
            kubeconfig,
        })
    }

    /// Queries bound to this session
    pub fn query(&self) -> &PipelineRunQuery {
        &self.query
    }

    /// Whether the session is backed by a temporary kubeconfig file
    pub fn uses_temporary_kubeconfig(&self) -> bool {
        self.kubeconfig.is_temporary()
    }
}

async fn build_client(config: &QueryConfig, kubeconfig: &MaterializedKubeconfig) -> Result<Client> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    let mut kube_config = match kubeconfig.load()? {
        Some(loaded) => {
            debug!("using explicit kubeconfig");
            Config::from_custom_kubeconfig(loaded, &options)
                .await
                .map_err(|e| Error::kubeconfig(e.to_string()))?
        }
        None if config.context.is_some() => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::kubeconfig(e.to_string()))?,
        None => Config::infer()
            .await
            .map_err(|e| Error::kubeconfig(e.to_string()))?,
    };

    kube_config.connect_timeout = Some(config.request_timeout);
    kube_config.read_timeout = Some(config.request_timeout);
    kube_config.write_timeout = Some(config.request_timeout);

    Client::try_from(kube_config).map_err(|e| Error::kubeconfig(e.to_string()))
}
