//! Kubeconfig sources and scoped materialization
//!
//! A kubeconfig can come from a file path, from an in-memory secret value (as
//! runbook platforms hand them out), or from the kube defaults (`KUBECONFIG` /
//! `~/.kube/config`). Secret values are written to a private temporary file for
//! as long as the [`MaterializedKubeconfig`] guard lives; the file is removed when
//! the guard drops, whichever way the caller leaves its scope.

use std::io::Write;
use std::path::{Path, PathBuf};

use kube::config::Kubeconfig;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{Error, Result};

const TEMP_KUBECONFIG_PREFIX: &str = "tekton-sli-kubeconfig-";
const TEMP_KUBECONFIG_SUFFIX: &str = ".yaml";

/// Kubeconfig contents held in memory
///
/// `Debug` never prints the contents.
#[derive(Clone)]
pub struct SecretKubeconfig(String);

impl SecretKubeconfig {
    /// Wrap kubeconfig contents
    pub fn new(contents: impl Into<String>) -> Self {
        Self(contents.into())
    }

    /// The raw kubeconfig contents
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretKubeconfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKubeconfig(<redacted>)")
    }
}

/// Where the kubeconfig comes from
#[derive(Clone, Debug, Default)]
pub enum KubeconfigSource {
    /// kube defaults: `KUBECONFIG` env, then `~/.kube/config`
    #[default]
    Default,
    /// A kubeconfig file on disk
    Path(PathBuf),
    /// Kubeconfig contents from a secret
    Secret(SecretKubeconfig),
}

impl KubeconfigSource {
    /// Pick a source from optional CLI values; a secret wins over a path
    pub fn resolve(path: Option<PathBuf>, secret: Option<String>) -> Self {
        match (secret, path) {
            (Some(secret), _) if !secret.trim().is_empty() => {
                Self::Secret(SecretKubeconfig::new(secret))
            }
            (_, Some(path)) if !path.as_os_str().is_empty() => Self::Path(path),
            _ => Self::Default,
        }
    }

    /// Make the kubeconfig available as a file for the lifetime of the guard
    pub fn materialize(&self) -> Result<MaterializedKubeconfig> {
        match self {
            Self::Default => Ok(MaterializedKubeconfig {
                path: None,
                temp_file: None,
            }),
            Self::Path(path) => Ok(MaterializedKubeconfig {
                path: Some(path.clone()),
                temp_file: None,
            }),
            Self::Secret(secret) => {
                let mut file = tempfile::Builder::new()
                    .prefix(TEMP_KUBECONFIG_PREFIX)
                    .suffix(TEMP_KUBECONFIG_SUFFIX)
                    .tempfile()
                    .map_err(|e| {
                        Error::kubeconfig(format!("failed to create temporary kubeconfig: {e}"))
                    })?;
                file.write_all(secret.expose().as_bytes())
                    .and_then(|_| file.flush())
                    .map_err(|e| {
                        Error::kubeconfig(format!("failed to write temporary kubeconfig: {e}"))
                    })?;
                debug!(path = %file.path().display(), "materialized secret kubeconfig");
                Ok(MaterializedKubeconfig {
                    path: Some(file.path().to_path_buf()),
                    temp_file: Some(file),
                })
            }
        }
    }
}

/// A kubeconfig available on disk for the guard's lifetime
///
/// For secret sources the backing file is deleted on drop.
#[derive(Debug)]
pub struct MaterializedKubeconfig {
    path: Option<PathBuf>,
    temp_file: Option<NamedTempFile>,
}

impl MaterializedKubeconfig {
    /// Path to the kubeconfig file; `None` means "use kube defaults"
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the file is a temporary copy of a secret
    pub fn is_temporary(&self) -> bool {
        self.temp_file.is_some()
    }

    /// Parse the kubeconfig, if there is one
    ///
    /// The path may be a list in `KUBECONFIG` form; its files are merged in
    /// order, earlier entries winning.
    pub fn load(&self) -> Result<Option<Kubeconfig>> {
        let Some(paths) = self.path.as_deref() else {
            return Ok(None);
        };

        let mut merged: Option<Kubeconfig> = None;
        for path in std::env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()) {
            let next = Kubeconfig::read_from(&path).map_err(|e| {
                Error::kubeconfig(format!("failed to read kubeconfig {}: {e}", path.display()))
            })?;
            merged = Some(match merged {
                Some(current) => current
                    .merge(next)
                    .map_err(|e| Error::kubeconfig(format!("failed to merge kubeconfigs: {e}")))?,
                None => next,
            });
        }

        merged
            .map(Some)
            .ok_or_else(|| Error::kubeconfig(format!("no kubeconfig in {}", paths.display())))
    }
}

impl Drop for MaterializedKubeconfig {
    fn drop(&mut self) {
        if let Some(file) = self.temp_file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => debug!(path = %path.display(), "removed temporary kubeconfig"),
                Err(e) => debug!(path = %path.display(), error = %e, "temporary kubeconfig already gone"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG_YAML: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: sandbox
  cluster:
    server: https://127.0.0.1:6443
contexts:
- name: sandbox-cluster-1
  context:
    cluster: sandbox
    user: runner
current-context: sandbox-cluster-1
users:
- name: runner
  user:
    token: not-a-real-token
"#;

    #[test]
    fn secret_wins_over_path() {
        let source = KubeconfigSource::resolve(
            Some(PathBuf::from("/etc/kubeconfig")),
            Some(KUBECONFIG_YAML.to_string()),
        );
        assert!(matches!(source, KubeconfigSource::Secret(_)));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let source = KubeconfigSource::resolve(Some(PathBuf::new()), Some("  ".to_string()));
        assert!(matches!(source, KubeconfigSource::Default));

        let source = KubeconfigSource::resolve(Some(PathBuf::from("/k")), None);
        assert!(matches!(source, KubeconfigSource::Path(p) if p == Path::new("/k")));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SecretKubeconfig::new(KUBECONFIG_YAML);
        let printed = format!("{:?}", KubeconfigSource::Secret(secret));
        assert!(!printed.contains("not-a-real-token"));
        assert!(printed.contains("redacted"));
    }

    /// Story: a secret kubeconfig exists on disk only while the guard lives
    #[test]
    fn story_secret_file_is_removed_when_guard_drops() {
        let source = KubeconfigSource::Secret(SecretKubeconfig::new(KUBECONFIG_YAML));
        let guard = source.materialize().unwrap();
        let path = guard.path().unwrap().to_path_buf();

        assert!(guard.is_temporary());
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), KUBECONFIG_YAML);

        drop(guard);
        assert!(!path.exists());
    }

    /// Story: an early return through `?` still cleans up
    #[test]
    fn story_secret_file_is_removed_on_error_path() {
        fn failing_query(source: &KubeconfigSource, seen: &mut Option<PathBuf>) -> Result<()> {
            let guard = source.materialize()?;
            *seen = guard.path().map(Path::to_path_buf);
            Err(Error::validation("query failed midway"))
        }

        let source = KubeconfigSource::Secret(SecretKubeconfig::new(KUBECONFIG_YAML));
        let mut seen = None;
        assert!(failing_query(&source, &mut seen).is_err());
        assert!(!seen.unwrap().exists());
    }

    #[test]
    fn secret_file_parses_as_kubeconfig() {
        let source = KubeconfigSource::Secret(SecretKubeconfig::new(KUBECONFIG_YAML));
        let guard = source.materialize().unwrap();
        let kc = guard.load().unwrap().unwrap();
        assert_eq!(kc.current_context.as_deref(), Some("sandbox-cluster-1"));
        assert_eq!(kc.contexts.len(), 1);
    }

    #[test]
    fn path_source_is_not_deleted() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), KUBECONFIG_YAML).unwrap();

        let source = KubeconfigSource::Path(file.path().to_path_buf());
        let guard = source.materialize().unwrap();
        assert!(!guard.is_temporary());
        assert_eq!(guard.path(), Some(file.path()));
        drop(guard);
        assert!(file.path().exists());
    }

    #[test]
    fn path_list_is_merged() {
        let cluster = NamedTempFile::new().unwrap();
        std::fs::write(cluster.path(), KUBECONFIG_YAML).unwrap();
        let other = NamedTempFile::new().unwrap();
        std::fs::write(
            other.path(),
            KUBECONFIG_YAML
                .replace("sandbox-cluster-1", "prod-cluster-1")
                .replace("name: sandbox", "name: prod")
                .replace("cluster: sandbox", "cluster: prod"),
        )
        .unwrap();

        let joined = std::env::join_paths([cluster.path(), other.path()]).unwrap();
        let guard = KubeconfigSource::Path(PathBuf::from(joined))
            .materialize()
            .unwrap();
        let kc = guard.load().unwrap().unwrap();

        let contexts: Vec<_> = kc.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(contexts, vec!["sandbox-cluster-1", "prod-cluster-1"]);
        assert_eq!(kc.current_context.as_deref(), Some("sandbox-cluster-1"));
    }

    #[test]
    fn default_source_has_no_file() {
        let guard = KubeconfigSource::Default.materialize().unwrap();
        assert!(guard.path().is_none());
        assert!(guard.load().unwrap().is_none());
    }

    #[test]
    fn missing_path_fails_to_load() {
        let guard = KubeconfigSource::Path(PathBuf::from("/nonexistent/kubeconfig"))
            .materialize()
            .unwrap();
        let err = guard.load().unwrap_err();
        assert!(matches!(err, Error::Kubeconfig(_)));
    }
}
