//! Interactive prompting for Signet command handlers.
//!
//! Handlers use a [`Prompter`] to collect values the command line did not
//! supply. Each question is one [`PromptSession`] driven through a small
//! state machine; sessions run strictly one at a time and block the
//! calling handler until resolved or cancelled.
//!
//! ```rust,ignore
//! use signet_prompts::{Choice, Prompter};
//!
//! let mut prompter = Prompter::stdio();
//! let name = prompter.ask("What is your name?")?;
//! let drop_it = prompter.confirm_default("Drop the database?", false)?;
//! let driver = prompter.choice(
//!     "Mail driver",
//!     vec![Choice::plain("smtp"), Choice::plain("ses")],
//! )?;
//! ```
//!
//! Input comes from a [`PromptSource`]; the terminal source reads stdin
//! (raw mode for secrets), and [`ScriptedSource`] replays fixed input so
//! the machine can be tested without a terminal. Editor-kind prompts hand
//! a scratch buffer to an [`Editor`] collaborator.

pub mod editor;
pub mod engine;
pub mod session;
pub mod source;

pub use editor::{Editor, EditorOutcome, EnvEditor};
pub use engine::{PromptValue, Prompter};
pub use session::{Choice, PromptError, PromptKind, PromptSession, PromptState};
pub use source::{PromptSource, ScriptedInput, ScriptedSource, TerminalSource};
