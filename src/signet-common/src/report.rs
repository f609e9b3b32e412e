//! Styled, level-tagged output for the dispatcher and command handlers.
//!
//! The reporter is purely presentational: it receives `(level, message)`
//! pairs and renders them to its writer. Colors respect the `NO_COLOR`
//! environment variable and can be disabled explicitly (the `--no-ansi`
//! global option routes here).

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Operation failed.
    Error,
    /// Something is off but execution continues.
    Warn,
    /// Neutral progress information.
    Info,
    /// Operation completed.
    Success,
}

impl Level {
    /// Short tag printed in front of the message.
    pub fn tag(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Success => "success",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Success => "\x1b[32m",
        }
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Check if colors should be disabled based on the NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Renders level-tagged messages to a writer.
pub struct Reporter {
    writer: Box<dyn Write + Send>,
    ansi: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").field("ansi", &self.ansi).finish()
    }
}

impl Reporter {
    /// Reporter over an arbitrary writer with colors enabled.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            ansi: !colors_disabled(),
        }
    }

    /// Reporter over stderr, colored only when stderr is a terminal.
    pub fn stderr() -> Self {
        let ansi = io::stderr().is_terminal() && !colors_disabled();
        Self {
            writer: Box::new(io::stderr()),
            ansi,
        }
    }

    /// Enable or disable ANSI styling.
    pub fn set_ansi(&mut self, ansi: bool) {
        self.ansi = ansi;
    }

    /// Whether ANSI styling is currently enabled.
    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// Report a message at the given level.
    pub fn report(&mut self, level: Level, message: &str) {
        let line = if self.ansi {
            format!(
                "{}{}{}{}{} {message}",
                BOLD,
                level.color(),
                level.tag(),
                RESET,
                ":"
            )
        } else {
            format!("{}: {message}", level.tag())
        };
        // Reporting failures are not actionable; drop them.
        let _ = writeln!(self.writer, "{line}");
    }

    /// Report an error message.
    pub fn error(&mut self, message: &str) {
        self.report(Level::Error, message);
    }

    /// Report a warning message.
    pub fn warn(&mut self, message: &str) {
        self.report(Level::Warn, message);
    }

    /// Report an informational message.
    pub fn info(&mut self, message: &str) {
        self.report(Level::Info, message);
    }

    /// Report a success message.
    pub fn success(&mut self, message: &str) {
        self.report(Level::Success, message);
    }

    /// Write a message with no level tag or styling.
    pub fn plain(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{message}");
    }
}

/// Clonable in-memory writer for capturing reporter output in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&inner).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
