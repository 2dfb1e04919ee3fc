//! Output management for CLI commands.
//!
//! Routes every command result through one place so text and JSON modes
//! stay consistent and a closed pipe (`redundex analyze | head`) is not
//! reported as a failure.

use crate::error::IndexError;
use crate::io::exit_code::ExitCode;
use crate::io::format::{JsonResponse, OutputFormat, ResponseMeta};
use serde::Serialize;
use std::io::{self, Write};

/// Manages output formatting and display.
pub struct OutputManager {
    format: OutputFormat,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl OutputManager {
    /// Create a new output manager with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Create an output manager with custom writers.
    pub fn new_with_writers(
        format: OutputFormat,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            stdout,
            stderr,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output a command result.
    ///
    /// JSON mode wraps `data` in a success response; text mode prints what
    /// `render` returns. `render` is not called in JSON mode.
    pub fn result<T, F>(
        &mut self,
        data: &T,
        meta: Option<ResponseMeta>,
        render: F,
    ) -> io::Result<ExitCode>
    where
        T: Serialize,
        F: FnOnce() -> String,
    {
        let text = match self.format {
            OutputFormat::Json => {
                let mut response = JsonResponse::success(data);
                if let Some(meta) = meta {
                    response = response.with_meta(meta);
                }
                serde_json::to_string_pretty(&response)?
            }
            OutputFormat::Text => render(),
        };
        ignore_broken_pipe(writeln!(self.stdout, "{text}"))?;
        Ok(ExitCode::Success)
    }

    /// Output an error with suggestions.
    pub fn error(&mut self, error: &IndexError) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error);
                let json = serde_json::to_string_pretty(&response)?;
                ignore_broken_pipe(writeln!(self.stderr, "{json}"))?;
            }
            OutputFormat::Text => {
                ignore_broken_pipe(writeln!(self.stderr, "Error: {error}"))?;
                for suggestion in error.recovery_suggestions() {
                    ignore_broken_pipe(writeln!(self.stderr, "  Suggestion: {suggestion}"))?;
                }
            }
        }
        Ok(ExitCode::from_error(error))
    }

    /// Output progress information (text mode only).
    ///
    /// In JSON mode, progress messages are suppressed to avoid
    /// polluting the JSON output.
    pub fn progress(&mut self, message: &str) -> io::Result<()> {
        if matches!(self.format, OutputFormat::Text) {
            ignore_broken_pipe(writeln!(self.stderr, "{message}"))?;
        }
        Ok(())
    }
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
