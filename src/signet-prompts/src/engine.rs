//! The prompt engine: drives one session at a time over an input source.
//!
//! Handlers create a [`Prompter`] and ask questions sequentially; each call
//! blocks until its session resolves or cancels, so prompts never overlap
//! and resolve strictly in issuance order. Cancellation aborts only the
//! prompt at hand; the caller decides whether to retry, skip, or abort.

use std::io::{self, Write};

use tracing::debug;

use crate::editor::{Editor, EnvEditor};
use crate::session::{
    Choice, PromptError, PromptKind, PromptSession, PromptState, match_choice, parse_confirm,
    toggle_choices,
};
use crate::source::{PromptSource, TerminalSource};

/// The value a resolved session yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValue {
    /// Text, secret, single-choice, or editor content.
    Text(String),
    /// Confirm answer.
    Confirmed(bool),
    /// Multi-choice selection, in choice declaration order.
    Many(Vec<String>),
}

/// Asks questions over an input source and renders them to a writer.
#[derive(Debug)]
pub struct Prompter<S, W> {
    source: S,
    output: W,
}

impl Prompter<TerminalSource, io::Stderr> {
    /// Prompter over the live terminal: stdin in, stderr out.
    pub fn stdio() -> Self {
        Self::new(TerminalSource::new(), io::stderr())
    }
}

impl<S: PromptSource, W: Write> Prompter<S, W> {
    /// Prompter over an arbitrary source and output.
    pub fn new(source: S, output: W) -> Self {
        Self { source, output }
    }

    /// Ask a free-text question; loops until non-empty input arrives.
    pub fn ask(&mut self, text: impl Into<String>) -> Result<String, PromptError> {
        self.run_text(&mut PromptSession::text(text))
    }

    /// Ask a free-text question where empty input resolves to `default`.
    pub fn ask_default(
        &mut self,
        text: impl Into<String>,
        default: impl Into<String>,
    ) -> Result<String, PromptError> {
        self.run_text(&mut PromptSession::text(text).with_default(default))
    }

    /// Ask a yes/no question with no default; loops until answered.
    pub fn confirm(&mut self, text: impl Into<String>) -> Result<bool, PromptError> {
        self.run_confirm(&mut PromptSession::confirm(text))
    }

    /// Ask a yes/no question where empty input takes `default`.
    pub fn confirm_default(
        &mut self,
        text: impl Into<String>,
        default: bool,
    ) -> Result<bool, PromptError> {
        let default = if default { "yes" } else { "no" };
        self.run_confirm(&mut PromptSession::confirm(text).with_default(default))
    }

    /// Ask for hidden input, accepted verbatim and never echoed.
    pub fn secret(&mut self, text: impl Into<String>) -> Result<String, PromptError> {
        self.run_secure(&mut PromptSession::secure(text))
    }

    /// Ask the user to pick one choice; returns its underlying value.
    pub fn choice(
        &mut self,
        text: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Result<String, PromptError> {
        self.run_choice(&mut PromptSession::choice(text, choices))
    }

    /// Ask the user to toggle any number of choices; returns the selected
    /// underlying values in declaration order.
    pub fn multi_choice(
        &mut self,
        text: impl Into<String>,
        choices: Vec<Choice>,
        preselected: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Vec<String>, PromptError> {
        self.run_multi(&mut PromptSession::multi_choice(text, choices, preselected))
    }

    /// Hand `initial` to an external editor and return the edited content.
    pub fn editor(
        &mut self,
        text: impl Into<String>,
        initial: impl Into<String>,
        editor: &dyn Editor,
    ) -> Result<String, PromptError> {
        self.run_editor(&mut PromptSession::editor(text).with_default(initial), editor)
    }

    /// Drive an explicit session to completion. Editor-kind sessions use
    /// the environment-resolved editor; see [`Prompter::run_with_editor`].
    pub fn run(&mut self, session: &mut PromptSession) -> Result<PromptValue, PromptError> {
        self.run_with_editor(session, &EnvEditor::new())
    }

    /// Drive an explicit session to completion with a specific editor
    /// collaborator.
    pub fn run_with_editor(
        &mut self,
        session: &mut PromptSession,
        editor: &dyn Editor,
    ) -> Result<PromptValue, PromptError> {
        match session.kind() {
            PromptKind::Text => self.run_text(session).map(PromptValue::Text),
            PromptKind::Confirm => self.run_confirm(session).map(PromptValue::Confirmed),
            PromptKind::Secure => self.run_secure(session).map(PromptValue::Text),
            PromptKind::Choice => self.run_choice(session).map(PromptValue::Text),
            PromptKind::MultiChoice => self.run_multi(session).map(PromptValue::Many),
            PromptKind::Editor => self.run_editor(session, editor).map(PromptValue::Text),
        }
    }

    fn run_text(&mut self, session: &mut PromptSession) -> Result<String, PromptError> {
        let mut note: Option<String> = None;
        loop {
            session.set_state(PromptState::Rendering);
            self.render_question(session, note.as_deref())?;
            session.set_state(PromptState::AwaitingInput);
            let Some(line) = self.source.read_line()? else {
                return cancelled(session);
            };
            session.set_state(PromptState::Validating);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                session.set_state(PromptState::Resolved);
                return Ok(trimmed.to_string());
            }
            if let Some(default) = session.default.clone() {
                session.set_state(PromptState::Resolved);
                return Ok(default);
            }
            note = Some("A value is required.".to_string());
        }
    }

    fn run_confirm(&mut self, session: &mut PromptSession) -> Result<bool, PromptError> {
        let mut note: Option<String> = None;
        loop {
            session.set_state(PromptState::Rendering);
            self.render_question(session, note.as_deref())?;
            session.set_state(PromptState::AwaitingInput);
            let Some(line) = self.source.read_line()? else {
                return cancelled(session);
            };
            session.set_state(PromptState::Validating);
            match parse_confirm(&line, session.default.as_deref()) {
                Ok(answer) => {
                    session.set_state(PromptState::Resolved);
                    return Ok(answer);
                }
                Err(message) => note = Some(message),
            }
        }
    }

    fn run_secure(&mut self, session: &mut PromptSession) -> Result<String, PromptError> {
        session.set_state(PromptState::Rendering);
        self.render_question(session, None)?;
        session.set_state(PromptState::AwaitingInput);
        let Some(secret) = self.source.read_secret()? else {
            return cancelled(session);
        };
        // Secret input is accepted verbatim; nothing to validate.
        session.set_state(PromptState::Validating);
        session.set_state(PromptState::Resolved);
        // The raw-mode read does not echo a newline; keep the output tidy.
        writeln!(self.output)?;
        Ok(secret)
    }

    fn run_choice(&mut self, session: &mut PromptSession) -> Result<String, PromptError> {
        let mut note: Option<String> = None;
        loop {
            session.set_state(PromptState::Rendering);
            self.render_choices(session, None, note.as_deref())?;
            session.set_state(PromptState::AwaitingInput);
            let Some(line) = self.source.read_line()? else {
                return cancelled(session);
            };
            session.set_state(PromptState::Validating);
            match match_choice(&line, &session.choices) {
                Ok(choice) => {
                    let value = choice.value.clone();
                    session.set_state(PromptState::Resolved);
                    return Ok(value);
                }
                Err(message) => note = Some(message),
            }
        }
    }

    fn run_multi(&mut self, session: &mut PromptSession) -> Result<Vec<String>, PromptError> {
        // Seed from the preselected values, normalized to declaration order.
        let mut selected: Vec<String> = session
            .choices
            .iter()
            .filter(|c| session.preselected.contains(&c.value))
            .map(|c| c.value.clone())
            .collect();
        let mut note: Option<String> = None;
        loop {
            session.set_state(PromptState::Rendering);
            self.render_choices(session, Some(&selected), note.as_deref())?;
            session.set_state(PromptState::AwaitingInput);
            let Some(line) = self.source.read_line()? else {
                return cancelled(session);
            };
            session.set_state(PromptState::Validating);
            match toggle_choices(&line, &session.choices, &mut selected) {
                Ok(true) => {
                    session.set_state(PromptState::Resolved);
                    return Ok(selected);
                }
                Ok(false) => note = None,
                Err(message) => note = Some(message),
            }
        }
    }

    fn run_editor(
        &mut self,
        session: &mut PromptSession,
        editor: &dyn Editor,
    ) -> Result<String, PromptError> {
        session.set_state(PromptState::Rendering);
        writeln!(self.output, "? {} (waiting for external editor)", session.text)?;
        session.set_state(PromptState::AwaitingInput);
        let initial = session.default.clone().unwrap_or_default();
        let outcome = editor.edit(&initial)?;
        session.set_state(PromptState::Validating);
        if !outcome.success {
            return cancelled(session);
        }
        session.set_state(PromptState::Resolved);
        Ok(outcome.content)
    }

    fn render_question(
        &mut self,
        session: &PromptSession,
        note: Option<&str>,
    ) -> io::Result<()> {
        if let Some(note) = note {
            writeln!(self.output, "  {note}")?;
        }
        let hint = match (session.kind(), session.default.as_deref()) {
            (PromptKind::Confirm, None) => " (y/n)".to_string(),
            (PromptKind::Confirm, Some(d)) if d.eq_ignore_ascii_case("yes") => {
                " (Y/n)".to_string()
            }
            (PromptKind::Confirm, Some(_)) => " (y/N)".to_string(),
            (_, Some(default)) => format!(" [{default}]"),
            (_, None) => String::new(),
        };
        write!(self.output, "? {}{hint}: ", session.text)?;
        self.output.flush()
    }

    fn render_choices(
        &mut self,
        session: &PromptSession,
        selected: Option<&[String]>,
        note: Option<&str>,
    ) -> io::Result<()> {
        if let Some(note) = note {
            writeln!(self.output, "  {note}")?;
        }
        writeln!(self.output, "? {}", session.text)?;
        for (index, choice) in session.choices.iter().enumerate() {
            match selected {
                Some(selected) => {
                    let mark = if selected.contains(&choice.value) { 'x' } else { ' ' };
                    writeln!(self.output, "  [{mark}] {}) {}", index + 1, choice.label)?;
                }
                None => writeln!(self.output, "  {}) {}", index + 1, choice.label)?,
            }
        }
        write!(self.output, "> ")?;
        self.output.flush()
    }
}

fn cancelled<T>(session: &mut PromptSession) -> Result<T, PromptError> {
    debug!("prompt cancelled by input source");
    session.set_state(PromptState::Cancelled);
    Err(PromptError::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorOutcome;
    use crate::source::{ScriptedInput, ScriptedSource};
    use pretty_assertions::assert_eq;

    fn prompter(lines: &[&str]) -> Prompter<ScriptedSource, Vec<u8>> {
        Prompter::new(ScriptedSource::lines(lines.to_vec()), Vec::new())
    }

    fn colors() -> Vec<Choice> {
        vec![
            Choice::new("Red", "red"),
            Choice::new("Green", "green"),
            Choice::new("Blue", "blue"),
        ]
    }

    struct FakeEditor {
        outcome: EditorOutcome,
    }

    impl Editor for FakeEditor {
        fn edit(&self, _initial: &str) -> io::Result<EditorOutcome> {
            Ok(self.outcome.clone())
        }
    }

    #[test]
    fn test_ask_returns_first_non_empty_line() {
        let mut prompter = prompter(&["", "virk"]);

        let answer = prompter.ask("What is your name?").unwrap();

        assert_eq!(answer, "virk");
        let rendered = String::from_utf8(prompter.output).unwrap();
        assert!(rendered.contains("A value is required."));
    }

    #[test]
    fn test_ask_default_resolves_empty_input() {
        let mut prompter = prompter(&[""]);

        let answer = prompter.ask_default("Name?", "virk").unwrap();

        assert_eq!(answer, "virk");
    }

    #[test]
    fn test_confirm_retries_until_yes_no() {
        let mut prompter = prompter(&["maybe", "YES"]);

        assert!(prompter.confirm("Continue?").unwrap());
    }

    #[test]
    fn test_confirm_default_on_empty() {
        let mut prompter = prompter(&[""]);

        assert!(!prompter.confirm_default("Destroy everything?", false).unwrap());
    }

    #[test]
    fn test_secret_is_verbatim_and_not_rendered() {
        let mut prompter = prompter(&["  s3cret  "]);

        let secret = prompter.secret("Password").unwrap();

        assert_eq!(secret, "  s3cret  ");
        let rendered = String::from_utf8(prompter.output).unwrap();
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_choice_accepts_index_or_label() {
        let mut prompter = prompter(&["2"]);
        assert_eq!(prompter.choice("Pick", colors()).unwrap(), "green");

        let mut prompter = self::prompter(&["Blue"]);
        assert_eq!(prompter.choice("Pick", colors()).unwrap(), "blue");
    }

    #[test]
    fn test_choice_loops_on_invalid_input() {
        let mut prompter = prompter(&["7", "1"]);

        assert_eq!(prompter.choice("Pick", colors()).unwrap(), "red");
        let rendered = String::from_utf8(prompter.output).unwrap();
        assert!(rendered.contains("'7' is not one of the choices."));
    }

    #[test]
    fn test_multi_choice_immediate_confirm_keeps_preselection() {
        let mut prompter = prompter(&[""]);

        let selected = prompter
            .multi_choice("Pick colors", colors(), ["red", "blue"])
            .unwrap();

        assert_eq!(selected, vec!["red", "blue"]);
    }

    #[test]
    fn test_multi_choice_toggle_then_confirm() {
        // Toggle green on and red off, then confirm.
        let mut prompter = prompter(&["green red", ""]);

        let selected = prompter
            .multi_choice("Pick colors", colors(), ["red"])
            .unwrap();

        assert_eq!(selected, vec!["green"]);
    }

    #[test]
    fn test_multi_choice_renders_selection_marks() {
        let mut prompter = prompter(&[""]);

        prompter
            .multi_choice("Pick colors", colors(), ["green"])
            .unwrap();

        let rendered = String::from_utf8(prompter.output).unwrap();
        assert!(rendered.contains("[ ] 1) Red"));
        assert!(rendered.contains("[x] 2) Green"));
    }

    #[test]
    fn test_interrupt_cancels_the_session() {
        let mut prompter = Prompter::new(
            ScriptedSource::new([ScriptedInput::Interrupt]),
            Vec::new(),
        );
        let mut session = PromptSession::text("Name?");

        let err = prompter.run(&mut session).unwrap_err();

        assert!(matches!(err, PromptError::Cancelled));
        assert_eq!(session.state(), PromptState::Cancelled);
    }

    #[test]
    fn test_session_ends_resolved() {
        let mut prompter = prompter(&["yes"]);
        let mut session = PromptSession::confirm("Proceed?");

        let value = prompter.run(&mut session).unwrap();

        assert_eq!(value, PromptValue::Confirmed(true));
        assert_eq!(session.state(), PromptState::Resolved);
    }

    #[test]
    fn test_editor_success_resolves_content() {
        let mut prompter = prompter(&[]);
        let editor = FakeEditor {
            outcome: EditorOutcome {
                content: "edited body".to_string(),
                success: true,
            },
        };

        let content = prompter.editor("Commit message", "initial", &editor).unwrap();

        assert_eq!(content, "edited body");
    }

    #[test]
    fn test_editor_failure_cancels() {
        let mut prompter = prompter(&[]);
        let mut session = PromptSession::editor("Commit message");
        let editor = FakeEditor {
            outcome: EditorOutcome {
                content: String::new(),
                success: false,
            },
        };

        let err = prompter.run_with_editor(&mut session, &editor).unwrap_err();

        assert!(matches!(err, PromptError::Cancelled));
        assert_eq!(session.state(), PromptState::Cancelled);
    }

    #[test]
    fn test_sequential_prompts_resolve_in_issuance_order() {
        let mut prompter = prompter(&["virk", "yes"]);

        let name = prompter.ask("Name?").unwrap();
        let confirmed = prompter.confirm("Save?").unwrap();

        assert_eq!(name, "virk");
        assert!(confirmed);
    }
}
