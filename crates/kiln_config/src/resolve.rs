//! Root resolution: merging project defaults with per-root overrides.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, ToolConfig};
use std::path::{Path, PathBuf};

/// A fully resolved build root with project defaults and root overrides merged.
///
/// Paths are still relative to the project directory; see [`ResolvedRoot::anchored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    /// The root name.
    pub name: String,
    /// Source tree.
    pub source: PathBuf,
    /// Destination tree for compiled artifacts.
    pub destination: PathBuf,
    /// Source suffix, without the dot.
    pub source_ext: String,
    /// Artifact suffix, without the dot.
    pub artifact_ext: String,
    /// Compiler for this root.
    pub compiler: ToolConfig,
    /// Analyzer for this root.
    pub analyzer: ToolConfig,
    /// Directory holding this root's persisted state (`<cache_dir>/<name>`).
    pub state_dir: PathBuf,
}

impl ResolvedRoot {
    /// Rebases every relative path onto `project_dir`.
    pub fn anchored(mut self, project_dir: &Path) -> Self {
        self.source = project_dir.join(&self.source);
        self.destination = project_dir.join(&self.destination);
        self.state_dir = project_dir.join(&self.state_dir);
        self
    }
}

/// Resolves a named build root.
///
/// Suffixes fall back to `[build]` when the root leaves them unset; a
/// root-level `compiler` or `analyzer` table replaces the project one entirely.
pub fn resolve_root(config: &ProjectConfig, root_name: &str) -> Result<ResolvedRoot, ConfigError> {
    let root = config
        .roots
        .get(root_name)
        .ok_or_else(|| ConfigError::UnknownRoot(root_name.to_string()))?;

    let source_ext = root
        .source_ext
        .clone()
        .unwrap_or_else(|| config.build.source_ext.clone());
    let artifact_ext = root
        .artifact_ext
        .clone()
        .unwrap_or_else(|| config.build.artifact_ext.clone());

    Ok(ResolvedRoot {
        name: root_name.to_string(),
        source: PathBuf::from(&root.source),
        destination: PathBuf::from(&root.destination),
        source_ext: source_ext.trim_start_matches('.').to_string(),
        artifact_ext: artifact_ext.trim_start_matches('.').to_string(),
        compiler: root.compiler.clone().unwrap_or_else(|| config.compiler.clone()),
        analyzer: root.analyzer.clone().unwrap_or_else(|| config.analyzer.clone()),
        state_dir: Path::new(&config.build.cache_dir).join(root_name),
    })
}

/// Resolves every configured root, in name order.
pub fn resolve_all(config: &ProjectConfig) -> Result<Vec<ResolvedRoot>, ConfigError> {
    config
        .roots
        .keys()
        .map(|name| resolve_root(config, name))
        .collect()
}
