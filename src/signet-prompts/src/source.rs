//! Input sources for the prompt engine.
//!
//! The state machine never touches the terminal directly; it pulls lines
//! and secrets from a [`PromptSource`]. The terminal source reads stdin
//! (raw mode for secrets, so they are never echoed); the scripted source
//! replays a fixed sequence and makes the machine deterministic in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Supplies input to prompt sessions.
///
/// `Ok(None)` signals interruption (end of input, escape, Ctrl+C); the
/// session receiving it moves to `Cancelled`.
pub trait PromptSource {
    /// Next line of visible input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Next line of hidden input. Implementations must not echo it.
    fn read_secret(&mut self) -> io::Result<Option<String>>;
}

/// Live terminal input over stdin.
#[derive(Debug, Default)]
pub struct TerminalSource;

impl TerminalSource {
    /// A stdin-backed source.
    pub fn new() -> Self {
        Self
    }
}

impl PromptSource for TerminalSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn read_secret(&mut self) -> io::Result<Option<String>> {
        terminal::enable_raw_mode()?;
        let result = collect_secret();
        terminal::disable_raw_mode()?;
        result
    }
}

/// Collect key presses into a secret until Enter. The characters are never
/// written back to the terminal.
fn collect_secret() -> io::Result<Option<String>> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };
        match code {
            KeyCode::Enter => return Ok(Some(secret)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A line the "user" typed.
    Line(String),
    /// An abort signal (Ctrl+C equivalent).
    Interrupt,
}

impl From<&str> for ScriptedInput {
    fn from(line: &str) -> Self {
        ScriptedInput::Line(line.to_string())
    }
}

/// Replays a fixed input sequence. An exhausted script behaves as an
/// interrupt, so a test that forgets an answer fails as a cancellation
/// instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    inputs: VecDeque<ScriptedInput>,
}

impl ScriptedSource {
    /// Source replaying the given inputs in order.
    pub fn new(inputs: impl IntoIterator<Item = ScriptedInput>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }

    /// Source replaying plain lines.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| ScriptedInput::Line(l.into())))
    }
}

impl PromptSource for ScriptedSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.inputs.pop_front() {
            Some(ScriptedInput::Line(line)) => Ok(Some(line)),
            Some(ScriptedInput::Interrupt) | None => Ok(None),
        }
    }

    fn read_secret(&mut self) -> io::Result<Option<String>> {
        self.read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_replays_in_order() {
        let mut source = ScriptedSource::lines(["first", "second"]);

        assert_eq!(source.read_line().unwrap(), Some("first".to_string()));
        assert_eq!(source.read_line().unwrap(), Some("second".to_string()));
        assert_eq!(source.read_line().unwrap(), None);
    }

    #[test]
    fn test_scripted_interrupt() {
        let mut source =
            ScriptedSource::new([ScriptedInput::from("kept"), ScriptedInput::Interrupt]);

        assert_eq!(source.read_line().unwrap(), Some("kept".to_string()));
        assert_eq!(source.read_line().unwrap(), None);
    }
}
