//! Signature expression parsing.
//!
//! A signature expression declares a command's name, positional arguments,
//! and flags in one string:
//!
//! ```text
//! make:controller
//!     { name : Name of the controller }
//!     { path?=app : Where to place it }
//!     { --force : Overwrite an existing file }
//!     { --template=@value : Use a custom template }
//! ```
//!
//! The expression is whitespace and newline insensitive outside `{ ... }`
//! blocks. Each block declares one argument or, when its body starts with
//! `--`, one flag. The literal `=@value` suffix marks a flag as
//! value-bearing; a `=default` suffix on an argument sets a default and
//! implies optionality.
//!
//! All structural validation happens here, at parse time, so the binder can
//! assume a well-formed signature.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing or validating a signature expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The expression has no command name.
    #[error("signature has no command name")]
    MissingName,

    /// The command name contains whitespace.
    #[error("command name '{0}' must not contain whitespace")]
    NameWithWhitespace(String),

    /// Two arguments share a name.
    #[error("duplicate argument '{0}'")]
    DuplicateArgument(String),

    /// Two flags share a name.
    #[error("duplicate flag '--{0}'")]
    DuplicateFlag(String),

    /// A required argument was declared after an optional one.
    #[error("required argument '{0}' cannot follow an optional argument")]
    RequiredAfterOptional(String),

    /// An argument declaration is malformed.
    #[error("invalid argument declaration '{0}'")]
    InvalidArgument(String),

    /// A flag declaration is malformed.
    #[error("invalid flag declaration '{0}'")]
    InvalidFlag(String),

    /// A `{` or `}` without a partner.
    #[error("unbalanced braces in signature")]
    UnbalancedBrace,

    /// The expression ends inside a `{ ... }` block.
    #[error("unterminated block in signature")]
    UnterminatedBlock,

    /// A `{}` block with nothing in it.
    #[error("empty block in signature")]
    EmptyBlock,
}

/// A positional input to a command.
///
/// `optional` is derived: an argument with a default is always optional,
/// whether or not it was declared with a trailing `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name, unique within the signature.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Whether the argument may be omitted at invocation time.
    pub optional: bool,
    /// Value used when the argument is omitted.
    pub default: Option<String>,
}

impl ArgumentSpec {
    /// A required argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            optional: false,
            default: None,
        }
    }

    /// An optional argument with no default.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(name)
        }
    }

    /// Set the description.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Set a default value. A defaulted argument is always optional.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self.optional = true;
        self
    }
}

/// Default value for a flag that was declared but not passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagDefault {
    /// Boolean default, for value-less flags.
    Bool(bool),
    /// String default, for value-bearing flags.
    Str(String),
}

impl From<bool> for FlagDefault {
    fn from(value: bool) -> Self {
        FlagDefault::Bool(value)
    }
}

impl From<&str> for FlagDefault {
    fn from(value: &str) -> Self {
        FlagDefault::Str(value.to_string())
    }
}

impl From<String> for FlagDefault {
    fn from(value: String) -> Self {
        FlagDefault::Str(value)
    }
}

/// A named, order-independent input to a command.
///
/// The name is stored without the `--` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Flag name, unique within the signature.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Whether the flag consumes a value token.
    pub expects_value: bool,
    /// Value used when the flag is declared but not passed. Not expressible
    /// in the grammar; set programmatically.
    pub default: Option<FlagDefault>,
}

impl FlagSpec {
    /// A value-less (boolean) flag.
    pub fn switch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            expects_value: false,
            default: None,
        }
    }

    /// A value-bearing flag.
    pub fn valued(name: impl Into<String>) -> Self {
        Self {
            expects_value: true,
            ..Self::switch(name)
        }
    }

    /// Set the description.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Set the default used when the flag is not passed.
    pub fn with_default(mut self, default: impl Into<FlagDefault>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A parsed command signature: name, ordered arguments, flags.
///
/// Immutable once registered; argument order is the positional binding
/// order, flag order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSignature {
    /// Command name, may contain `:` as a namespace separator.
    pub name: String,
    /// Positional arguments in binding order.
    pub arguments: Vec<ArgumentSpec>,
    /// Declared flags.
    pub flags: Vec<FlagSpec>,
}

impl CommandSignature {
    /// Parse a signature expression.
    pub fn parse(expression: &str) -> Result<Self, SignatureError> {
        let (outside, blocks) = scan_blocks(expression)?;

        let name = outside.split_whitespace().collect::<Vec<_>>();
        let name = match name.as_slice() {
            [] => return Err(SignatureError::MissingName),
            [single] => (*single).to_string(),
            _ => return Err(SignatureError::NameWithWhitespace(outside.trim().to_string())),
        };

        let mut arguments: Vec<ArgumentSpec> = Vec::new();
        let mut flags: Vec<FlagSpec> = Vec::new();
        for block in blocks {
            match parse_block(&block)? {
                Entry::Argument(arg) => {
                    if arguments.iter().any(|a| a.name == arg.name) {
                        return Err(SignatureError::DuplicateArgument(arg.name));
                    }
                    if !arg.optional && arguments.iter().any(|a| a.optional) {
                        return Err(SignatureError::RequiredAfterOptional(arg.name));
                    }
                    arguments.push(arg);
                }
                Entry::Flag(flag) => {
                    if flags.iter().any(|f| f.name == flag.name) {
                        return Err(SignatureError::DuplicateFlag(flag.name));
                    }
                    flags.push(flag);
                }
            }
        }

        Ok(Self {
            name,
            arguments,
            flags,
        })
    }

    /// Look up an argument spec by its declared name.
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Look up a flag spec by its declared name (without the `--` marker).
    pub fn flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Set the default for a declared flag. Unknown names are ignored.
    pub fn with_flag_default(mut self, name: &str, default: impl Into<FlagDefault>) -> Self {
        if let Some(flag) = self.flags.iter_mut().find(|f| f.name == name) {
            flag.default = Some(default.into());
        }
        self
    }

    /// Render the canonical expression form.
    ///
    /// Re-parsing the result yields an equal signature. A defaulted
    /// argument renders as `name=default` since the default already implies
    /// optionality.
    pub fn expression(&self) -> String {
        let mut out = self.name.clone();
        for arg in &self.arguments {
            out.push_str(" { ");
            out.push_str(&arg.name);
            match &arg.default {
                Some(default) => {
                    out.push('=');
                    out.push_str(default);
                }
                None if arg.optional => out.push('?'),
                None => {}
            }
            if !arg.description.is_empty() {
                out.push_str(" : ");
                out.push_str(&arg.description);
            }
            out.push_str(" }");
        }
        for flag in &self.flags {
            out.push_str(" { --");
            out.push_str(&flag.name);
            if flag.expects_value {
                out.push_str("=@value");
            }
            if !flag.description.is_empty() {
                out.push_str(" : ");
                out.push_str(&flag.description);
            }
            out.push_str(" }");
        }
        out
    }
}

enum Entry {
    Argument(ArgumentSpec),
    Flag(FlagSpec),
}

/// Split an expression into the text outside blocks and the block bodies.
fn scan_blocks(expression: &str) -> Result<(String, Vec<String>), SignatureError> {
    let mut outside = String::new();
    let mut blocks = Vec::new();
    let mut body = String::new();
    let mut in_block = false;

    for ch in expression.chars() {
        if in_block {
            match ch {
                '}' => {
                    blocks.push(std::mem::take(&mut body));
                    in_block = false;
                }
                '{' => return Err(SignatureError::UnbalancedBrace),
                _ => body.push(ch),
            }
        } else {
            match ch {
                '{' => in_block = true,
                '}' => return Err(SignatureError::UnbalancedBrace),
                _ => outside.push(ch),
            }
        }
    }
    if in_block {
        return Err(SignatureError::UnterminatedBlock);
    }
    Ok((outside, blocks))
}

/// Split a block body into its head and description at the first
/// unescaped `:`. `\:` keeps a literal colon in the head.
fn split_description(body: &str) -> (String, String) {
    let mut head = String::new();
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(':') => head.push(':'),
                Some(other) => {
                    head.push('\\');
                    head.push(other);
                }
                None => head.push('\\'),
            },
            ':' => {
                return (
                    head.trim().to_string(),
                    chars.as_str().trim().to_string(),
                );
            }
            _ => head.push(ch),
        }
    }
    (head.trim().to_string(), String::new())
}

fn parse_block(body: &str) -> Result<Entry, SignatureError> {
    let (head, description) = split_description(body);
    if head.is_empty() {
        return Err(SignatureError::EmptyBlock);
    }

    if let Some(flag) = head.strip_prefix("--") {
        let (name, expects_value) = match flag.strip_suffix("=@value") {
            Some(name) => (name, true),
            None => (flag, false),
        };
        if name.is_empty() || name.contains('=') || name.chars().any(char::is_whitespace) {
            return Err(SignatureError::InvalidFlag(head));
        }
        return Ok(Entry::Flag(FlagSpec {
            name: name.to_string(),
            description,
            expects_value,
            default: None,
        }));
    }

    let (name_part, default) = match head.split_once('=') {
        Some((name, default)) => (name.trim_end(), Some(default.trim_start().to_string())),
        None => (head.as_str(), None),
    };
    // `@value` is the flag value marker, never a concrete argument default.
    if default.as_deref() == Some("@value") {
        return Err(SignatureError::InvalidArgument(head.clone()));
    }
    let (name, explicit_optional) = match name_part.strip_suffix('?') {
        Some(name) => (name.trim_end(), true),
        None => (name_part, false),
    };
    if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(SignatureError::InvalidArgument(head.clone()));
    }
    let optional = explicit_optional || default.is_some();
    Ok(Entry::Argument(ArgumentSpec {
        name: name.to_string(),
        description,
        optional,
        default,
    }))
}
