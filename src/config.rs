//! Query configuration
//!
//! A [`QueryConfig`] is an immutable value describing one logical unit of work:
//! which cluster and context to talk to, which Tekton API version and namespace
//! to read, and the time window to report on. Reconfiguring means building a new
//! value, never mutating a shared one.

use std::collections::BTreeMap;
use std::time::Duration;

use kube::api::ListParams;

use crate::kubeconfig::KubeconfigSource;
use crate::logs::LogSource;
use crate::query::TimeWindow;
use crate::{Error, Result};

/// Immutable configuration for PipelineRun queries
#[derive(Clone, Debug)]
pub struct QueryConfig {
    /// Where the kubeconfig comes from
    pub kubeconfig: KubeconfigSource,
    /// Kubeconfig context; `None` uses the kubeconfig's current context
    pub context: Option<String>,
    /// Tekton API version (e.g. "v1beta1", "v1")
    pub tekton_version: String,
    /// Namespace holding the PipelineRuns
    pub namespace: String,
    /// Only runs created within this window are counted
    pub window: TimeWindow,
    /// Label selector applied to the listing
    pub label_selector: Option<String>,
    /// Field selector applied to the listing
    pub field_selector: Option<String>,
    /// Deadline for each API request and each log fetch
    pub request_timeout: Duration,
    /// How step logs are retrieved
    pub log_source: LogSource,
    /// Extra environment for the log-retrieval command
    pub log_env: BTreeMap<String, String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            kubeconfig: KubeconfigSource::Default,
            context: Some(crate::DEFAULT_CONTEXT.to_string()),
            tekton_version: crate::DEFAULT_TEKTON_VERSION.to_string(),
            namespace: crate::DEFAULT_NAMESPACE.to_string(),
            window: TimeWindow::from_secs(crate::DEFAULT_TIME_INTERVAL_SECS),
            label_selector: None,
            field_selector: None,
            request_timeout: Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
            log_source: LogSource::default(),
            log_env: BTreeMap::new(),
        }
    }
}

impl QueryConfig {
    /// Set the kubeconfig source
    pub fn with_kubeconfig(mut self, source: KubeconfigSource) -> Self {
        self.kubeconfig = source;
        self
    }

    /// Set the kubeconfig context; an empty name selects the current context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.is_empty()).then_some(context);
        self
    }

    /// Set the Tekton API version
    pub fn with_tekton_version(mut self, version: impl Into<String>) -> Self {
        self.tekton_version = version.into();
        self
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the time window
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the time window from a decimal seconds string
    ///
    /// Fails before any network activity when the value is not a non-negative
    /// integer.
    pub fn with_time_interval(self, interval: &str) -> Result<Self> {
        Ok(self.with_window(TimeWindow::parse(interval)?))
    }

    /// Set the label selector
    pub fn with_label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }

    /// Set the field selector
    pub fn with_field_selector(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = Some(selector.into());
        self
    }

    /// Set the per-request deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the log source
    pub fn with_log_source(mut self, source: LogSource) -> Self {
        self.log_source = source;
        self
    }

    /// Add an environment override for the log-retrieval command
    pub fn with_log_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.log_env.insert(key.into(), value.into());
        self
    }

    /// List options carrying the configured selectors
    pub fn list_params(&self) -> ListParams {
        let mut params = ListParams::default();
        if let Some(labels) = &self.label_selector {
            params = params.labels(labels);
        }
        if let Some(fields) = &self.field_selector {
            params = params.fields(fields);
        }
        params
    }
}

/// Parse a `KEY=VALUE` environment override
pub fn parse_env_override(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| Error::validation(format!("invalid env override '{s}', expected KEY=VALUE")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::validation(format!(
            "invalid env override '{s}', variable name is empty"
        )));
    }
    Ok((key.to_string(), value.to_string()))
}
