//! Shared collaborators for the Signet command engine.
//!
//! This crate holds the simple I/O surfaces the engine and its command
//! handlers talk to:
//!
//! - [`report`] - level-tagged, color-aware message output and a capture
//!   buffer for tests
//! - [`table`] - aligned plain-text table rendering
//! - [`fsx`] - async file-system convenience wrappers
//!
//! Nothing in here carries engine logic; these are presentation and I/O
//! helpers consumed by `signet-commands` and application code.

pub mod fsx;
pub mod report;
pub mod table;

pub use report::{Level, Reporter, SharedBuffer};
pub use table::{TableOptions, render_table};
