//! Binding of raw invocation tokens against a parsed signature.
//!
//! The binder assumes a structurally valid [`CommandSignature`] (the parser
//! enforces that at registration time) and focuses purely on matching the
//! runtime tokens. Binding is deterministic: the same signature and tokens
//! always produce the same [`BoundInvocation`] or the same error.

use std::collections::HashMap;

use thiserror::Error;

use crate::signature::{CommandSignature, FlagDefault};

/// Token prefix that marks a flag. A token carrying the marker is never
/// eligible for positional binding.
pub const FLAG_MARKER: &str = "--";

/// Errors raised while binding tokens to a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    /// A required argument had no positional token.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// A positional token was left over after all arguments were bound.
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    /// A flag token does not match any declared flag.
    #[error("unknown flag '--{0}'")]
    UnknownFlag(String),

    /// A value-bearing flag was passed without a value.
    #[error("flag '--{0}' expects a value")]
    MissingFlagValue(String),
}

/// A value resolved for one argument or flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// A string value from a token or default.
    Str(String),
    /// A boolean, for value-less flags.
    Bool(bool),
    /// Optional input that was absent with no default.
    Null,
}

impl BoundValue {
    /// The string value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BoundValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoundValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether the input was absent with no default.
    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }
}

impl From<&FlagDefault> for BoundValue {
    fn from(default: &FlagDefault) -> Self {
        match default {
            FlagDefault::Bool(b) => BoundValue::Bool(*b),
            FlagDefault::Str(s) => BoundValue::Str(s.clone()),
        }
    }
}

/// Arguments and flags resolved for one dispatch, consumed by the handler.
///
/// Keys are normalized to camel form (`file-path` becomes `filePath`) so
/// handlers address inputs uniformly regardless of how they were written on
/// the command line. Lookups normalize too, so either spelling works.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundInvocation {
    arguments: HashMap<String, BoundValue>,
    flags: HashMap<String, BoundValue>,
}

impl BoundInvocation {
    /// Resolved value for an argument.
    pub fn argument(&self, name: &str) -> Option<&BoundValue> {
        self.arguments.get(&camel_key(name))
    }

    /// Resolved value for a flag.
    pub fn flag(&self, name: &str) -> Option<&BoundValue> {
        self.flags.get(&camel_key(name))
    }

    /// String value of an argument, if present and non-null.
    pub fn argument_str(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(BoundValue::as_str)
    }

    /// String value of a flag, if present and non-null.
    pub fn flag_str(&self, name: &str) -> Option<&str> {
        self.flag(name).and_then(BoundValue::as_str)
    }

    /// Boolean value of a flag; `false` when unset or not boolean.
    pub fn flag_bool(&self, name: &str) -> bool {
        self.flag(name).and_then(BoundValue::as_bool).unwrap_or(false)
    }

    /// All bound arguments, keyed by camel-form name.
    pub fn arguments(&self) -> &HashMap<String, BoundValue> {
        &self.arguments
    }

    /// All bound flags, keyed by camel-form name.
    pub fn flags(&self) -> &HashMap<String, BoundValue> {
        &self.flags
    }
}

/// Join a `-`/`_`-separated name into camel form: `file-path` → `filePath`.
pub fn camel_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' || ch == '_' {
            // A leading separator does not capitalize the first word.
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Bind invocation tokens against a signature.
///
/// Flag tokens may appear anywhere among positional tokens; only the
/// relative order of positional tokens determines argument assignment. A
/// value-bearing flag takes its value from an inline `--flag=value` form or
/// from the token that follows it, which is then not considered positional.
pub fn bind(signature: &CommandSignature, tokens: &[String]) -> Result<BoundInvocation, BindError> {
    let mut flags: HashMap<String, BoundValue> = HashMap::new();
    let mut positionals: Vec<&str> = Vec::new();

    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let Some(body) = token.strip_prefix(FLAG_MARKER) else {
            positionals.push(token.as_str());
            continue;
        };
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let spec = signature
            .flag(name)
            .ok_or_else(|| BindError::UnknownFlag(name.to_string()))?;
        let value = if spec.expects_value {
            match inline {
                Some(value) => BoundValue::Str(value.to_string()),
                None => match iter.next_if(|next| !next.starts_with(FLAG_MARKER)) {
                    Some(value) => BoundValue::Str(value.clone()),
                    None => return Err(BindError::MissingFlagValue(name.to_string())),
                },
            }
        } else {
            // An inline value on a value-less flag is ignored; presence
            // alone makes it true.
            BoundValue::Bool(true)
        };
        flags.insert(camel_key(name), value);
    }

    // Declared flags absent from the input resolve to their default.
    for spec in &signature.flags {
        let key = camel_key(&spec.name);
        if !flags.contains_key(&key) {
            let value = match &spec.default {
                Some(default) => default.into(),
                None if spec.expects_value => BoundValue::Null,
                None => BoundValue::Bool(false),
            };
            flags.insert(key, value);
        }
    }

    let mut arguments: HashMap<String, BoundValue> = HashMap::new();
    let mut pos = positionals.into_iter();
    for spec in &signature.arguments {
        let value = match pos.next() {
            Some(token) => BoundValue::Str(token.to_string()),
            None if spec.optional => spec
                .default
                .clone()
                .map(BoundValue::Str)
                .unwrap_or(BoundValue::Null),
            None => return Err(BindError::MissingArgument(spec.name.clone())),
        };
        arguments.insert(camel_key(&spec.name), value);
    }
    if let Some(extra) = pos.next() {
        return Err(BindError::UnexpectedArgument(extra.to_string()));
    }

    Ok(BoundInvocation { arguments, flags })
}
