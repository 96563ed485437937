//! Running the compiler and analyzer as child processes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use kiln_common::{ArtifactId, UnitKey};
use kiln_diagnostics::Diagnostic;
use kiln_graph::{BuildInvoker, BuildOutcome, DependencyEdge, DependencyHarvester, ToolError};
use tracing::{debug, trace};

use crate::command::ToolCommand;
use crate::transcript::{parse_dependency_edges, parse_diagnostics, parse_written_artifacts};

/// Compiler collaborator backed by an external program.
///
/// The program is run as `<program> <args...> <unit...>`, with `{src}` and
/// `{dest}` substituted in `args`. Standard output and standard error are
/// both scraped: verbose compilers tend to write their progress log to
/// stderr.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    command: ToolCommand,
    source_root: PathBuf,
}

impl ProcessCompiler {
    /// Creates a compiler for a root whose sources live under `source_root`.
    pub fn new(command: ToolCommand, source_root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            source_root: source_root.into(),
        }
    }
}

impl BuildInvoker for ProcessCompiler {
    fn invoke(
        &mut self,
        working_set: &BTreeSet<UnitKey>,
        destination: &Path,
    ) -> Result<BuildOutcome, ToolError> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(self.command.expand_args(&self.source_root, destination));
        cmd.args(working_set.iter().map(UnitKey::as_str));
        debug!(program = %self.command.program, units = working_set.len(), "running compiler");

        let output = run(&mut cmd, &self.command.program)?;
        let transcript = combined_transcript(&output);
        trace!(%transcript, "compiler transcript");

        let written = parse_written_artifacts(&transcript);
        let mut diagnostics = parse_diagnostics(&transcript);
        if !output.status.success() && diagnostics.is_empty() {
            diagnostics.push(
                Diagnostic::error(format!(
                    "{} exited with {} without reporting a diagnostic",
                    self.command.program, output.status
                ))
                .with_note(last_line(&output.stderr)),
            );
        }
        Ok(BuildOutcome {
            written,
            diagnostics,
        })
    }
}

/// Dependency analyzer backed by an external program.
///
/// Run as `<program> <args...> <artifact...>`; only standard output is
/// scraped for edges. Class-level lines are resolved against the artifact
/// tree: a dependency counts when it was just written or already exists
/// under the destination.
#[derive(Debug, Clone)]
pub struct ProcessAnalyzer {
    command: ToolCommand,
    source_root: PathBuf,
    artifact_root: PathBuf,
    artifact_ext: String,
}

impl ProcessAnalyzer {
    /// Creates an analyzer for the artifacts of one build root.
    pub fn new(
        command: ToolCommand,
        source_root: impl Into<PathBuf>,
        artifact_root: impl Into<PathBuf>,
        artifact_ext: &str,
    ) -> Self {
        Self {
            command,
            source_root: source_root.into(),
            artifact_root: artifact_root.into(),
            artifact_ext: artifact_ext.trim_start_matches('.').to_string(),
        }
    }
}

impl DependencyHarvester for ProcessAnalyzer {
    fn harvest(&mut self, written: &BTreeSet<ArtifactId>) -> Result<Vec<DependencyEdge>, ToolError> {
        if written.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = Command::new(&self.command.program);
        cmd.args(
            self.command
                .expand_args(&self.source_root, &self.artifact_root),
        );
        cmd.args(written.iter().map(ArtifactId::as_str));
        debug!(program = %self.command.program, artifacts = written.len(), "running analyzer");

        let output = run(&mut cmd, &self.command.program)?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.command.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!(transcript = %stdout, "analyzer transcript");
        let is_artifact = |path: &Path| written.contains(&ArtifactId::from_path(path)) || path.is_file();
        Ok(parse_dependency_edges(
            &stdout,
            &self.artifact_root,
            &self.artifact_ext,
            is_artifact,
        ))
    }
}

fn run(cmd: &mut Command, program: &str) -> Result<Output, ToolError> {
    cmd.output().map_err(|source| ToolError::Launch {
        program: program.to_string(),
        source,
    })
}

fn combined_transcript(output: &Output) -> String {
    let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
    if !transcript.is_empty() && !transcript.ends_with('\n') {
        transcript.push('\n');
    }
    transcript.push_str(&String::from_utf8_lossy(&output.stderr));
    transcript
}

fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("(no output)")
        .trim()
        .to_string()
}
