//! External-process implementations of the engine's collaborators.
//!
//! [`ProcessCompiler`] runs a compiler in verbose mode and scrapes its
//! transcript for written-artifact records and diagnostics.
//! [`ProcessAnalyzer`] runs a dependency analyzer over the written artifacts
//! and scrapes `artifact -> artifact` pairs. The scraping lives in
//! [`transcript`] so it can be tested without launching anything.

#![warn(missing_docs)]

pub mod command;
pub mod process;
pub mod transcript;

pub use command::ToolCommand;
pub use process::{ProcessAnalyzer, ProcessCompiler};
