//! CLI commands
//!
//! Every command shares [`QueryArgs`], which is validated into a [`QueryConfig`]
//! before a session is opened, so a malformed interval fails without touching
//! the cluster.

pub mod counts;
pub mod failures;
mod format;
pub mod runs;
pub mod sli;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::config::{parse_env_override, QueryConfig};
use crate::kubeconfig::KubeconfigSource;
use crate::logs::LogSource;
use crate::query::RunSnapshot;
use crate::{Error, Result};

/// Connection and query settings shared by every command
#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Kubeconfig file or path list (default: $KUBECONFIG or ~/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig contents; takes precedence over --kubeconfig
    #[arg(
        long,
        env = "TEKTON_SLI_KUBECONFIG_SECRET",
        hide_env_values = true,
        global = true
    )]
    pub kubeconfig_secret: Option<String>,

    /// Kubeconfig context (empty for the current context)
    #[arg(long, default_value = crate::DEFAULT_CONTEXT, global = true)]
    pub context: String,

    /// Tekton API version
    #[arg(long, default_value = crate::DEFAULT_TEKTON_VERSION, global = true)]
    pub tekton_version: String,

    /// Namespace holding the PipelineRuns
    #[arg(short, long, default_value = crate::DEFAULT_NAMESPACE, global = true)]
    pub namespace: String,

    /// Look-back window in seconds
    #[arg(long, default_value = crate::DEFAULT_TIME_INTERVAL, global = true)]
    pub time_interval: String,

    /// Only consider PipelineRuns matching this label selector
    #[arg(short = 'l', long, global = true)]
    pub label_selector: Option<String>,

    /// Only consider PipelineRuns matching this field selector
    #[arg(long, global = true)]
    pub field_selector: Option<String>,

    /// Deadline in seconds for each API request and log fetch
    #[arg(long, default_value_t = crate::DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub request_timeout: u64,

    /// How step logs are retrieved
    #[arg(long, value_enum, default_value_t = LogSource::Kubectl, global = true)]
    pub log_source: LogSource,

    /// Extra environment for the log command (repeatable)
    #[arg(long = "log-env", value_name = "KEY=VALUE", global = true)]
    pub log_env: Vec<String>,

    /// Fail when PipelineRuns cannot be listed instead of reporting no data
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub output: OutputFormat,
}

impl QueryArgs {
    /// How command results are presented
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            output: self.output,
            strict: self.strict,
        }
    }
}

impl TryFrom<&QueryArgs> for QueryConfig {
    type Error = Error;

    fn try_from(args: &QueryArgs) -> Result<Self> {
        let mut config = QueryConfig::default()
            .with_kubeconfig(KubeconfigSource::resolve(
                args.kubeconfig.clone(),
                args.kubeconfig_secret.clone(),
            ))
            .with_context(args.context.clone())
            .with_tekton_version(args.tekton_version.clone())
            .with_namespace(args.namespace.clone())
            .with_time_interval(&args.time_interval)?
            .with_request_timeout(Duration::from_secs(args.request_timeout))
            .with_log_source(args.log_source);

        if let Some(labels) = &args.label_selector {
            config = config.with_label_selector(labels.clone());
        }
        if let Some(fields) = &args.field_selector {
            config = config.with_field_selector(fields.clone());
        }
        for entry in &args.log_env {
            let (key, value) = parse_env_override(entry)?;
            config = config.with_log_env(key, value);
        }
        Ok(config)
    }
}

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table or text (default)
    #[default]
    #[value(alias = "text")]
    Table,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

/// Presentation options shared by every command
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Output format
    pub output: OutputFormat,
    /// Treat an unavailable listing as an error
    pub strict: bool,
}

impl RunOptions {
    /// Apply strict handling to a snapshot
    pub fn check(&self, snapshot: RunSnapshot) -> Result<RunSnapshot> {
        if self.strict {
            snapshot.into_result()
        } else {
            Ok(snapshot)
        }
    }
}

/// Serialize `value` for machine-readable formats; `None` for table output
pub fn to_structured<T: Serialize + ?Sized>(value: &T, output: OutputFormat) -> Result<Option<String>> {
    match output {
        OutputFormat::Table => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tekton-sli"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_produce_default_config() {
        let cli = parse(&["sli"]);
        let config = QueryConfig::try_from(&cli.query).unwrap();
        assert_eq!(config.namespace, "jx");
        assert_eq!(config.tekton_version, "v1beta1");
        assert_eq!(config.context.as_deref(), Some("sandbox-cluster-1"));
        assert_eq!(config.window.as_secs(), 86400);
        assert_eq!(cli.query.output, OutputFormat::Table);
    }

    #[test]
    fn flags_after_the_subcommand_are_accepted() {
        let cli = parse(&[
            "counts",
            "-n",
            "ci",
            "--time-interval",
            "3600",
            "-l",
            "app=web",
            "--log-env",
            "HTTPS_PROXY=http://proxy:3128",
            "-o",
            "yaml",
        ]);
        let config = QueryConfig::try_from(&cli.query).unwrap();
        assert_eq!(config.namespace, "ci");
        assert_eq!(config.window.as_secs(), 3600);
        assert_eq!(config.label_selector.as_deref(), Some("app=web"));
        assert_eq!(config.log_env["HTTPS_PROXY"], "http://proxy:3128");
        assert_eq!(cli.query.output, OutputFormat::Yaml);
    }

    /// Story: a typo in the interval is rejected before any cluster call
    #[test]
    fn story_bad_interval_is_a_validation_error() {
        let cli = parse(&["sli", "--time-interval", "1d"]);
        let err = QueryConfig::try_from(&cli.query).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn bad_log_env_is_a_validation_error() {
        let cli = parse(&["failures", "--log-env", "NOVALUE"]);
        assert!(matches!(
            QueryConfig::try_from(&cli.query).unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[test]
    fn empty_context_uses_current_context() {
        let cli = parse(&["sli", "--context", ""]);
        assert!(QueryConfig::try_from(&cli.query).unwrap().context.is_none());
    }

    /// Story: a merged KUBECONFIG list is left to the kube defaults
    #[test]
    fn story_kubeconfig_env_is_not_read_as_a_single_path() {
        let joined = std::env::join_paths(["/tmp/team-a.yaml", "/tmp/team-b.yaml"]).unwrap();
        std::env::set_var("KUBECONFIG", &joined);

        let cli = parse(&["sli"]);
        assert!(cli.query.kubeconfig.is_none());
        let config = QueryConfig::try_from(&cli.query).unwrap();
        assert!(matches!(config.kubeconfig, KubeconfigSource::Default));
    }

    #[test]
    fn explicit_kubeconfig_flag_is_a_path_source() {
        let cli = parse(&["sli", "--kubeconfig", "/etc/runbook/kubeconfig"]);
        let config = QueryConfig::try_from(&cli.query).unwrap();
        assert!(matches!(config.kubeconfig, KubeconfigSource::Path(_)));
    }

    #[test]
    fn text_is_an_alias_for_table() {
        let cli = parse(&["runs", "-o", "text"]);
        assert_eq!(cli.query.output, OutputFormat::Table);
    }

    #[test]
    fn structured_output_formats() {
        let value = crate::query::run_counts(3, 1);
        assert!(to_structured(&value, OutputFormat::Table).unwrap().is_none());

        let json = to_structured(&value, OutputFormat::Json).unwrap().unwrap();
        assert!(json.contains("\"totalRuns\": 3"));

        let yaml = to_structured(&value, OutputFormat::Yaml).unwrap().unwrap();
        assert!(yaml.contains("failedRuns: 1"));
    }

    #[test]
    fn strict_turns_unavailable_into_error() {
        let snapshot = RunSnapshot {
            total: vec![],
            failed: vec![],
            unavailable: Some("forbidden".to_string()),
        };
        let lenient = RunOptions::default();
        assert!(lenient.check(snapshot.clone()).is_ok());

        let strict = RunOptions {
            strict: true,
            ..RunOptions::default()
        };
        assert!(matches!(strict.check(snapshot), Err(Error::Unavailable(_))));
    }
}
