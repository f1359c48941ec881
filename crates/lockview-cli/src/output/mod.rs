//! Terminal output formatting and utilities.
//!
//! This module provides consistent output formatting across all commands,
//! including colors, JSON output and error messages.

pub mod colors;
pub mod errors;

use std::io::{self, Write};

use serde::Serialize;

use lockview_core::error::{LockviewError, LockviewResult};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Handler that never emits escape codes
    pub fn plain() -> Self {
        Self {
            colors: colors::ColorSupport::disabled(),
        }
    }

    pub fn colors(&self) -> &colors::ColorSupport {
        &self.colors
    }

    /// Print a line of command output as is
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print `value` as pretty JSON on stdout
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> LockviewResult<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)
            .map_err(|e| LockviewError::io("Failed to write JSON output".to_string(), e.into()))?;
        writeln!(stdout).map_err(|e| LockviewError::io("Failed to write JSON output".to_string(), e))
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
