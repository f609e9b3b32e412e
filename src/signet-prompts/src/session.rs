//! Prompt sessions: one interactive question and its state machine.
//!
//! A session moves through
//! `Idle → Rendering → AwaitingInput → Validating` and from there either
//! loops back to `Rendering` (invalid input), reaches `Resolved`, or
//! reaches `Cancelled`. The engine drives the transitions; the validation
//! rules live here as plain functions so they are trivially testable.

use thiserror::Error;

/// Errors surfaced to the prompting handler.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The input source signalled interruption. Recoverable: the handler
    /// decides whether to retry, skip, or abort the command.
    #[error("prompt was cancelled")]
    Cancelled,

    /// Reading input or writing the prompt failed.
    #[error("prompt I/O failed")]
    Io(#[from] std::io::Error),
}

/// What kind of question a session asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Free-form text.
    Text,
    /// Yes/no confirmation.
    Confirm,
    /// Hidden input, never echoed.
    Secure,
    /// Pick one choice.
    Choice,
    /// Toggle any number of choices.
    MultiChoice,
    /// Edit a scratch buffer in an external editor.
    Editor,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// Created, not yet shown.
    Idle,
    /// Emitting the question (and choices) to the output.
    Rendering,
    /// Suspended on the input source. The only blocking point.
    AwaitingInput,
    /// Checking the received input.
    Validating,
    /// Finished with a value.
    Resolved,
    /// Interrupted; no value was produced.
    Cancelled,
}

/// One selectable entry of a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// What the user sees.
    pub label: String,
    /// What the handler receives.
    pub value: String,
}

impl Choice {
    /// A choice with distinct label and value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// A choice whose label doubles as its value.
    pub fn plain(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
        }
    }
}

/// One interactive question. Ephemeral: created per prompt call, dropped
/// when it resolves or cancels.
#[derive(Debug, Clone)]
pub struct PromptSession {
    pub(crate) kind: PromptKind,
    pub(crate) text: String,
    pub(crate) choices: Vec<Choice>,
    pub(crate) preselected: Vec<String>,
    pub(crate) default: Option<String>,
    state: PromptState,
}

impl PromptSession {
    fn new(kind: PromptKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            choices: Vec::new(),
            preselected: Vec::new(),
            default: None,
            state: PromptState::Idle,
        }
    }

    /// A free-text question.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(PromptKind::Text, text)
    }

    /// A yes/no confirmation.
    pub fn confirm(text: impl Into<String>) -> Self {
        Self::new(PromptKind::Confirm, text)
    }

    /// A hidden-input question.
    pub fn secure(text: impl Into<String>) -> Self {
        Self::new(PromptKind::Secure, text)
    }

    /// A single-choice question.
    pub fn choice(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            choices,
            ..Self::new(PromptKind::Choice, text)
        }
    }

    /// A multi-choice question with preselected values.
    pub fn multi_choice(
        text: impl Into<String>,
        choices: Vec<Choice>,
        preselected: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            choices,
            preselected: preselected.into_iter().map(Into::into).collect(),
            ..Self::new(PromptKind::MultiChoice, text)
        }
    }

    /// An external-editor question.
    pub fn editor(text: impl Into<String>) -> Self {
        Self::new(PromptKind::Editor, text)
    }

    /// Set the default used when input is empty (free-text and confirm).
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// What kind of question this is.
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PromptState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PromptState) {
        self.state = state;
    }
}

/// Interpret confirm input. Empty input takes the default when one exists;
/// anything else must be a yes/no equivalent, case-insensitively.
pub(crate) fn parse_confirm(input: &str, default: Option<&str>) -> Result<bool, String> {
    let mut answer = input.trim();
    if answer.is_empty() {
        match default {
            Some(d) => answer = d,
            None => return Err("Please answer yes or no.".to_string()),
        }
    }
    match answer.to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err("Please answer yes or no.".to_string()),
    }
}

/// Match one token against the choice list: a 1-based index, a label, or an
/// underlying value.
pub(crate) fn match_choice<'a>(token: &str, choices: &'a [Choice]) -> Result<&'a Choice, String> {
    let token = token.trim();
    if let Ok(index) = token.parse::<usize>()
        && index >= 1
        && index <= choices.len()
    {
        return Ok(&choices[index - 1]);
    }
    choices
        .iter()
        .find(|c| c.label == token || c.value == token)
        .ok_or_else(|| format!("'{token}' is not one of the choices."))
}

/// Apply one line of multi-choice input to the current selection.
///
/// Empty input confirms the selection as it stands. Otherwise each
/// whitespace- or comma-separated token toggles one choice; the updated
/// selection keeps the declaration order of `choices`.
pub(crate) fn toggle_choices(
    input: &str,
    choices: &[Choice],
    selected: &mut Vec<String>,
) -> Result<bool, String> {
    if input.trim().is_empty() {
        return Ok(true);
    }
    // Resolve every token before applying any toggle, so an invalid line
    // leaves the selection untouched.
    let mut picked = Vec::new();
    for token in input.split([' ', ',', '\t']).filter(|t| !t.is_empty()) {
        picked.push(match_choice(token, choices)?);
    }
    for choice in picked {
        if let Some(at) = selected.iter().position(|v| *v == choice.value) {
            selected.remove(at);
        } else {
            selected.push(choice.value.clone());
        }
    }
    selected.sort_by_key(|value| choices.iter().position(|c| c.value == *value));
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn choices() -> Vec<Choice> {
        vec![
            Choice::new("Red", "red"),
            Choice::new("Green", "green"),
            Choice::new("Blue", "blue"),
        ]
    }

    #[test]
    fn test_parse_confirm_accepts_yes_no_case_insensitively() {
        assert_eq!(parse_confirm("y", None), Ok(true));
        assert_eq!(parse_confirm("YES", None), Ok(true));
        assert_eq!(parse_confirm("No", None), Ok(false));
        assert_eq!(parse_confirm(" n ", None), Ok(false));
    }

    #[test]
    fn test_parse_confirm_rejects_other_input() {
        assert!(parse_confirm("maybe", None).is_err());
        assert!(parse_confirm("", None).is_err());
    }

    #[test]
    fn test_parse_confirm_empty_takes_default() {
        assert_eq!(parse_confirm("", Some("yes")), Ok(true));
        assert_eq!(parse_confirm("", Some("no")), Ok(false));
        // Explicit input still wins.
        assert_eq!(parse_confirm("n", Some("yes")), Ok(false));
    }

    #[test]
    fn test_match_choice_by_index_label_and_value() {
        let all = choices();
        assert_eq!(match_choice("1", &all).unwrap().value, "red");
        assert_eq!(match_choice("Green", &all).unwrap().value, "green");
        assert_eq!(match_choice("blue", &all).unwrap().value, "blue");
    }

    #[test]
    fn test_match_choice_rejects_out_of_range_and_unknown() {
        let all = choices();
        assert!(match_choice("0", &all).is_err());
        assert!(match_choice("4", &all).is_err());
        assert!(match_choice("purple", &all).is_err());
    }

    #[test]
    fn test_toggle_choices_empty_confirms() {
        let mut selected = vec!["green".to_string()];
        let confirmed = toggle_choices("", &choices(), &mut selected).unwrap();

        assert!(confirmed);
        assert_eq!(selected, vec!["green"]);
    }

    #[test]
    fn test_toggle_choices_toggles_membership() {
        let mut selected = vec!["green".to_string()];

        let confirmed = toggle_choices("1 green", &choices(), &mut selected).unwrap();

        assert!(!confirmed);
        // "green" toggled off, "red" toggled on.
        assert_eq!(selected, vec!["red"]);
    }

    #[test]
    fn test_toggle_choices_keeps_declaration_order() {
        let mut selected = Vec::new();

        toggle_choices("blue,red", &choices(), &mut selected).unwrap();

        assert_eq!(selected, vec!["red", "blue"]);
    }

    #[test]
    fn test_toggle_choices_invalid_line_leaves_selection_untouched() {
        let mut selected = vec!["blue".to_string()];

        assert!(toggle_choices("red purple", &choices(), &mut selected).is_err());

        assert_eq!(selected, vec!["blue"]);
    }
}
