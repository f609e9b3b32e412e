//! External editor collaborator for editor-kind prompts.
//!
//! The contract is small: accept an initial buffer, hand back the final
//! content and whether the editor exited cleanly. A non-zero exit cancels
//! the prompt.

use std::io::{self, Write};
use std::process::Command;

use tracing::debug;

/// Result of one editing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOutcome {
    /// The buffer content when the editor exited.
    pub content: String,
    /// Whether the editor exited with status zero.
    pub success: bool,
}

/// Anything that can edit a scratch buffer.
pub trait Editor {
    /// Edit `initial` and return the final content with the exit status.
    fn edit(&self, initial: &str) -> io::Result<EditorOutcome>;
}

/// Editor that spawns the command from `$VISUAL` / `$EDITOR` (`vi` as a
/// last resort) on a temporary scratch file.
#[derive(Debug, Default)]
pub struct EnvEditor {
    command: Option<String>,
}

impl EnvEditor {
    /// Editor resolved from the environment at edit time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor with a fixed command line, e.g. `"code --wait"`.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }

    fn resolve_command(&self) -> String {
        self.command
            .clone()
            .or_else(|| std::env::var("VISUAL").ok().filter(|v| !v.is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl Editor for EnvEditor {
    fn edit(&self, initial: &str) -> io::Result<EditorOutcome> {
        let command_line = self.resolve_command();
        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(io::Error::other("editor command is empty"));
        };

        let mut file = tempfile::Builder::new()
            .prefix("signet-prompt-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(initial.as_bytes())?;
        file.flush()?;

        debug!(editor = program, "spawning external editor");
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()?;

        let content = std::fs::read_to_string(file.path())?;
        Ok(EditorOutcome {
            content,
            success: status.success(),
        })
    }
}
