//! Shared helpers for CLI commands.
//!
//! Project root discovery, build-root selection, and wiring a resolved root
//! to its process-backed builder.

use std::path::{Path, PathBuf};

use kiln_config::{ProjectConfig, ResolvedRoot, ToolConfig, CONFIG_FILE};
use kiln_graph::{Builder, Naming};
use kiln_toolchain::{ProcessAnalyzer, ProcessCompiler, ToolCommand};

use crate::GlobalArgs;

/// Version stamped into persisted build state.
pub const KILN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The builder type every configured root uses.
pub type RootBuilder = Builder<ProcessCompiler, ProcessAnalyzer>;

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`.
/// The result is always absolute so unit keys stay stable across commands.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    if let Some(ref config_path) = global.config {
        let p = cwd.join(config_path);
        if p.is_file() {
            Ok(p.parent().map(Path::to_path_buf).unwrap_or(cwd))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&cwd)
    }
}

/// Resolves the roots a command operates on, anchored at `project_dir`.
///
/// `None` selects every configured root, in name order.
pub fn select_roots(
    config: &ProjectConfig,
    project_dir: &Path,
    name: Option<&str>,
) -> Result<Vec<ResolvedRoot>, kiln_config::ConfigError> {
    let roots = match name {
        Some(name) => vec![kiln_config::resolve_root(config, name)?],
        None => kiln_config::resolve_all(config)?,
    };
    Ok(roots
        .into_iter()
        .map(|root| root.anchored(project_dir))
        .collect())
}

/// The naming contract of a resolved root.
pub fn naming_for(root: &ResolvedRoot) -> Naming {
    Naming::new(
        &root.source,
        &root.destination,
        &root.source_ext,
        &root.artifact_ext,
    )
}

/// Wires a resolved root to the configured compiler and analyzer processes.
pub fn builder_for(root: &ResolvedRoot) -> RootBuilder {
    let compiler = ProcessCompiler::new(tool_command(&root.compiler), &root.source);
    let analyzer = ProcessAnalyzer::new(
        tool_command(&root.analyzer),
        &root.source,
        &root.destination,
        &root.artifact_ext,
    );
    Builder::new(compiler, analyzer, naming_for(root))
}

fn tool_command(tool: &ToolConfig) -> ToolCommand {
    ToolCommand::new(&tool.program, &tool.args)
}

/// Shortens `path` to be relative to `base` for display.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
