//! Command registry: name to `(signature, handler)` resolution.
//!
//! Registration runs at application start-up and validates signatures as
//! they come in; after that the registry is read-only and dispatch resolves
//! against it with plain shared references.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::binder::BoundInvocation;
use crate::signature::{CommandSignature, SignatureError};

/// Errors raised at registration time. Both are fatal: a process with a
/// malformed or colliding registration serves no commands.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A command with this name is already registered.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    /// The signature expression failed to parse.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// The unit of application logic behind a command.
///
/// Any `Send + Sync` type with an async `run` can be registered; there is
/// no base-class hierarchy. Errors surface through the dispatcher as
/// handler failures with the cause preserved.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Execute with the bound arguments and flags.
    async fn run(&self, invocation: BoundInvocation) -> anyhow::Result<()>;
}

/// Adapter that lets a plain async closure act as a [`Handler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(BoundInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn run(&self, invocation: BoundInvocation) -> anyhow::Result<()> {
        (self.0)(invocation).await
    }
}

/// Wrap an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(BoundInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    FnHandler(f)
}

/// A registered `(signature, handler)` pair.
#[derive(Clone)]
pub struct RegisteredCommand {
    /// The command's parsed signature.
    pub signature: CommandSignature,
    /// The handler invoked once binding succeeds.
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Process-wide mapping from command name to its registration.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `expression` and register `handler` under the parsed name.
    pub fn register(
        &mut self,
        expression: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RegistryError> {
        let signature = CommandSignature::parse(expression)?;
        self.register_signature(signature, Arc::new(handler))
    }

    /// Register a pre-parsed signature with its handler.
    pub fn register_signature(
        &mut self,
        signature: CommandSignature,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RegistryError> {
        if self.commands.contains_key(&signature.name) {
            return Err(RegistryError::DuplicateCommand(signature.name.clone()));
        }
        debug!(command = %signature.name, "registered command");
        self.commands.insert(
            signature.name.clone(),
            RegisteredCommand { signature, handler },
        );
        Ok(())
    }

    /// Resolve a command by name.
    pub fn resolve(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    /// Whether a command with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All registrations, sorted by command name.
    pub fn list(&self) -> Vec<&RegisteredCommand> {
        let mut entries: Vec<&RegisteredCommand> = self.commands.values().collect();
        entries.sort_by(|a, b| a.signature.name.cmp(&b.signature.name));
        entries
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> impl Handler {
        handler_fn(|_invocation| async { Ok(()) })
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = CommandRegistry::new();
        registry.register("greet { name }", noop()).unwrap();

        let entry = registry.resolve("greet").unwrap();
        assert_eq!(entry.signature.name, "greet");
        assert!(registry.contains("greet"));
        assert!(registry.resolve("absent").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register("greet", noop()).unwrap();

        let err = registry.register("greet { name }", noop()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand(name) if name == "greet"));
    }

    #[test]
    fn test_malformed_signature_rejected_at_registration() {
        let mut registry = CommandRegistry::new();

        let err = registry.register("greet { name", noop()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Signature(SignatureError::UnterminatedBlock)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let mut registry = CommandRegistry::new();
        registry.register("migration:run", noop()).unwrap();
        registry.register("greet", noop()).unwrap();
        registry.register("send:email", noop()).unwrap();

        let names: Vec<&str> = registry
            .list()
            .iter()
            .map(|entry| entry.signature.name.as_str())
            .collect();
        assert_eq!(names, vec!["greet", "migration:run", "send:email"]);
    }

    #[tokio::test]
    async fn test_resolved_handler_runs() {
        let mut registry = CommandRegistry::new();
        registry
            .register("fail", handler_fn(|_| async { anyhow::bail!("boom") }))
            .unwrap();

        let entry = registry.resolve("fail").unwrap();
        let err = entry.handler.run(BoundInvocation::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
