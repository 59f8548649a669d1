//! `kubectl logs` based log retrieval

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{LogFetcher, LogRequest};
use crate::{Error, Result, CONTAINERS_EXITED};

/// Command output for testability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether command succeeded
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Trait for executing external commands (allows mocking in tests)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and extra environment, capturing its output
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<CommandOutput>;
}

/// Runs commands with tokio's process support
#[derive(Default, Clone)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .envs(env)
            .kill_on_drop(true)
            .output()
            .await?;
        Ok(CommandOutput::from(output))
    }
}

/// Log fetcher that runs `kubectl logs`
pub struct KubectlLogFetcher<R: CommandRunner = TokioCommandRunner> {
    kubeconfig: Option<PathBuf>,
    timeout: Duration,
    runner: R,
}

impl KubectlLogFetcher<TokioCommandRunner> {
    /// Create a fetcher using `kubeconfig` (or kubectl's defaults when `None`)
    pub fn new(kubeconfig: Option<PathBuf>, timeout: Duration) -> Self {
        Self::with_runner(kubeconfig, timeout, TokioCommandRunner)
    }
}

impl<R: CommandRunner> KubectlLogFetcher<R> {
    /// Create a fetcher with a custom command runner
    pub fn with_runner(kubeconfig: Option<PathBuf>, timeout: Duration, runner: R) -> Self {
        Self {
            kubeconfig,
            timeout,
            runner,
        }
    }

    /// Environment for the kubectl process; caller overrides win
    fn command_env(&self, request: &LogRequest) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        if let Some(path) = &self.kubeconfig {
            env.insert("KUBECONFIG".to_string(), path.to_string_lossy().into_owned());
        }
        env.extend(request.env.clone());
        env
    }
}

/// Arguments for `kubectl logs` of one container
pub(crate) fn kubectl_logs_args(request: &LogRequest) -> Vec<String> {
    let mut args = vec![
        "logs".to_string(),
        request.pod.clone(),
        "-c".to_string(),
        request.container.clone(),
        "-n".to_string(),
        request.namespace.clone(),
    ];
    if let Some(context) = &request.context {
        args.push("--context".to_string());
        args.push(context.clone());
    }
    args
}

#[async_trait]
impl<R: CommandRunner> LogFetcher for KubectlLogFetcher<R> {
    async fn fetch(&self, request: &LogRequest) -> Result<String> {
        let args = kubectl_logs_args(request);
        let env = self.command_env(request);

        let output = timeout(self.timeout, self.runner.run("kubectl", &args, &env))
            .await
            .map_err(|_| {
                Error::log_retrieval(
                    &request.pod,
                    &request.container,
                    format!("kubectl logs timed out after {:?}", self.timeout),
                )
            })?
            .map_err(|e| Error::log_retrieval(&request.pod, &request.container, e.to_string()))?;

        if output.success {
            return Ok(output.stdout);
        }

        let stderr = output.stderr.trim();
        if !is_exited_container_output(stderr) {
            return Err(Error::log_retrieval(&request.pod, &request.container, stderr));
        }

        debug!(
            pod = %request.pod,
            container = %request.container,
            stderr = %stderr,
            "kubectl logs failed, container has exited"
        );
        Ok(CONTAINERS_EXITED.to_string())
    }
}

/// Whether kubectl's stderr says the container or its logs are gone
///
/// Mirrors the 400/404 statuses the API fetcher treats as exited containers.
fn is_exited_container_output(stderr: &str) -> bool {
    stderr.contains("(NotFound)")
        || stderr.contains("(BadRequest)")
        || stderr.contains("unable to retrieve container logs")
}
