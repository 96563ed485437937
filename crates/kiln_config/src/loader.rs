//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, ToolConfig};
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    validate_tool(&config.compiler, "compiler")?;
    validate_tool(&config.analyzer, "analyzer")?;
    validate_ext(&config.build.source_ext, "build.source_ext")?;
    validate_ext(&config.build.artifact_ext, "build.artifact_ext")?;
    if config.build.cache_dir.is_empty() {
        return Err(ConfigError::MissingField("build.cache_dir".to_string()));
    }
    if config.roots.is_empty() {
        return Err(ConfigError::MissingField("roots".to_string()));
    }

    for (name, root) in &config.roots {
        // Root names become directory names under the cache dir.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::ValidationError(format!(
                "invalid root name '{name}'"
            )));
        }
        if root.source.is_empty() {
            return Err(ConfigError::MissingField(format!("roots.{name}.source")));
        }
        if root.destination.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "roots.{name}.destination"
            )));
        }
        if Path::new(&root.source) == Path::new(&root.destination) {
            return Err(ConfigError::ValidationError(format!(
                "root '{name}' uses '{}' as both source and destination",
                root.source
            )));
        }
        if let Some(ext) = &root.source_ext {
            validate_ext(ext, &format!("roots.{name}.source_ext"))?;
        }
        if let Some(ext) = &root.artifact_ext {
            validate_ext(ext, &format!("roots.{name}.artifact_ext"))?;
        }
        if let Some(tool) = &root.compiler {
            validate_tool(tool, &format!("roots.{name}.compiler"))?;
        }
        if let Some(tool) = &root.analyzer {
            validate_tool(tool, &format!("roots.{name}.analyzer"))?;
        }
        let source_ext = root.source_ext.as_ref().unwrap_or(&config.build.source_ext);
        let artifact_ext = root
            .artifact_ext
            .as_ref()
            .unwrap_or(&config.build.artifact_ext);
        if source_ext.trim_start_matches('.') == artifact_ext.trim_start_matches('.') {
            return Err(ConfigError::ValidationError(format!(
                "root '{name}' uses '{source_ext}' as both source and artifact suffix"
            )));
        }
    }
    Ok(())
}

fn validate_tool(tool: &ToolConfig, field: &str) -> Result<(), ConfigError> {
    if tool.program.is_empty() {
        return Err(ConfigError::MissingField(format!("{field}.program")));
    }
    Ok(())
}

fn validate_ext(ext: &str, field: &str) -> Result<(), ConfigError> {
    if ext.trim_start_matches('.').is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    Ok(())
}
