//! Compiler diagnostics as seen by the build orchestrator.
//!
//! The external compiler reports problems in its transcript; the toolchain
//! layer lifts them into structured [`Diagnostic`] values with a [`Severity`]
//! and an optional source [`Location`]. Any diagnostic at all fails a build
//! round. [`DiagnosticRenderer`] implementations format them for the terminal.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod renderer;
pub mod severity;

pub use diagnostic::{Diagnostic, Location};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
