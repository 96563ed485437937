//! Command lines with root-directory placeholders.

use std::path::Path;

/// A program plus argument template.
///
/// Arguments may contain `{src}` and `{dest}`, replaced by the source and
/// artifact roots of the build root being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path.
    pub program: String,
    /// Argument template, placed before the per-call operands.
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Creates a command template.
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the argument template with placeholders filled in.
    pub fn expand_args(&self, src: &Path, dest: &Path) -> Vec<String> {
        let src = src.to_string_lossy();
        let dest = dest.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{src}", &src).replace("{dest}", &dest))
            .collect()
    }
}
