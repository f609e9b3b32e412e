//! Top-level dispatch: argv in, exit code out.
//!
//! The dispatcher strips global options, resolves the command in the
//! registry, binds the remaining tokens, and invokes the handler. It is the
//! only component that decides process exit, so external resources a
//! handler opened are never torn down mid-execution; closing them is the
//! handler's responsibility.

use thiserror::Error;
use tracing::debug;

use signet_common::{Reporter, TableOptions, render_table};

use crate::binder::{BindError, bind};
use crate::registry::CommandRegistry;

/// Errors surfaced while dispatching one invocation. All of these are
/// recovered at the dispatcher boundary: they are reported to the error
/// channel and mapped to a non-zero exit code, never a crash.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command registered under this name.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Token binding failed; the handler was never invoked.
    #[error("invalid invocation of '{command}': {source}")]
    Bind {
        /// The command whose signature rejected the tokens.
        command: String,
        /// The command's declared signature expression.
        expression: String,
        /// The underlying binding failure.
        #[source]
        source: BindError,
    },

    /// The handler itself failed; the original cause is preserved.
    #[error("command '{command}' failed")]
    Handler {
        /// The command whose handler failed.
        command: String,
        /// The handler's error.
        #[source]
        source: anyhow::Error,
    },
}

/// Exit code for any dispatch failure.
const EXIT_FAILURE: i32 = 1;

/// Resolves, binds, and runs commands from raw argv tokens.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    reporter: Reporter,
    environment: Option<String>,
}

impl Dispatcher {
    /// Dispatcher reporting to stderr.
    pub fn new(registry: CommandRegistry) -> Self {
        Self::with_reporter(registry, Reporter::stderr())
    }

    /// Dispatcher reporting through the given reporter.
    pub fn with_reporter(registry: CommandRegistry, reporter: Reporter) -> Self {
        Self {
            registry,
            reporter,
            environment: None,
        }
    }

    /// Execution-environment override from a `--env` global option, if one
    /// was seen. Never passed to handlers.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// The registry backing this dispatcher.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Dispatch one invocation and return the process exit code.
    ///
    /// An empty argv prints usage and exits 0. Registration-time errors do
    /// not occur here; the registry was validated as it was built.
    pub async fn run<I>(&mut self, argv: I) -> i32
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let tokens = self.strip_global_options(argv);

        let Some((command, rest)) = tokens.split_first() else {
            self.print_usage();
            return 0;
        };

        match self.dispatch(command, rest).await {
            Ok(()) => 0,
            Err(err) => {
                self.report_failure(&err);
                EXIT_FAILURE
            }
        }
    }

    async fn dispatch(&self, command: &str, tokens: &[String]) -> Result<(), DispatchError> {
        let Some(entry) = self.registry.resolve(command) else {
            return Err(DispatchError::UnknownCommand(command.to_string()));
        };
        let invocation =
            bind(&entry.signature, tokens).map_err(|source| DispatchError::Bind {
                command: command.to_string(),
                expression: entry.signature.expression(),
                source,
            })?;
        debug!(command, "invoking handler");
        entry
            .handler
            .run(invocation)
            .await
            .map_err(|source| DispatchError::Handler {
                command: command.to_string(),
                source,
            })
    }

    /// Strip recognized global options appearing before the command name:
    /// `--env <name>` / `--env=<name>` and `--no-ansi`. Neither reaches the
    /// handler.
    fn strip_global_options(&mut self, argv: Vec<String>) -> Vec<String> {
        let mut rest: Vec<String> = Vec::new();
        let mut iter = argv.into_iter();
        while let Some(token) = iter.next() {
            if rest.is_empty() {
                if token == "--no-ansi" {
                    self.reporter.set_ansi(false);
                    continue;
                }
                if token == "--env" {
                    self.environment = iter.next();
                    continue;
                }
                if let Some(value) = token.strip_prefix("--env=") {
                    self.environment = Some(value.to_string());
                    continue;
                }
            }
            rest.push(token);
        }
        rest
    }

    fn report_failure(&mut self, err: &DispatchError) {
        match err {
            DispatchError::UnknownCommand(_) => {
                self.reporter.error(&err.to_string());
                self.reporter.plain("Run with no arguments to list available commands.");
            }
            DispatchError::Bind { expression, .. } => {
                self.reporter.error(&err.to_string());
                self.reporter.plain(&format!("Usage: {expression}"));
            }
            DispatchError::Handler { source, .. } => {
                // `{:#}` renders the whole cause chain on one line.
                self.reporter.error(&format!("{err}: {source:#}"));
            }
        }
    }

    fn print_usage(&mut self) {
        if self.registry.is_empty() {
            self.reporter.info("no commands registered");
            return;
        }
        self.reporter.plain("Available commands:");
        self.reporter.plain("");
        let rows: Vec<Vec<String>> = self
            .registry
            .list()
            .into_iter()
            .map(|entry| {
                let expression = entry.signature.expression();
                let inputs = expression[entry.signature.name.len()..].trim_start().to_string();
                vec![entry.signature.name.clone(), inputs]
            })
            .collect();
        let table = render_table(&["Command", "Signature"], &rows, &TableOptions::default());
        for line in table.lines() {
            self.reporter.plain(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::handler_fn;
    use signet_common::SharedBuffer;

    fn reporter(buffer: &SharedBuffer) -> Reporter {
        let mut reporter = Reporter::new(buffer.clone());
        reporter.set_ansi(false);
        reporter
    }

    #[tokio::test]
    async fn test_empty_argv_prints_usage_and_exits_zero() {
        let mut registry = CommandRegistry::new();
        registry
            .register("greet { name : Who }", handler_fn(|_| async { Ok(()) }))
            .unwrap();

        let buffer = SharedBuffer::new();
        let mut dispatcher = Dispatcher::with_reporter(registry, reporter(&buffer));

        let code = dispatcher.run(Vec::<String>::new()).await;

        assert_eq!(code, 0);
        let out = buffer.contents();
        assert!(out.contains("Available commands:"));
        assert!(out.contains("greet"));
        assert!(out.contains("{ name : Who }"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported() {
        let buffer = SharedBuffer::new();
        let mut dispatcher =
            Dispatcher::with_reporter(CommandRegistry::new(), reporter(&buffer));

        let code = dispatcher.run(["nope"]).await;

        assert_eq!(code, 1);
        assert!(buffer.contents().contains("unknown command 'nope'"));
    }

    #[tokio::test]
    async fn test_bind_error_reports_usage_and_skips_handler() {
        let invoked = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen = invoked.clone();

        let mut registry = CommandRegistry::new();
        registry
            .register(
                "greet { name : Who }",
                handler_fn(move |_| {
                    let seen = seen.clone();
                    async move {
                        seen.store(true, std::sync::atomic::Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let buffer = SharedBuffer::new();
        let mut dispatcher = Dispatcher::with_reporter(registry, reporter(&buffer));

        let code = dispatcher.run(["greet"]).await;

        assert_eq!(code, 1);
        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
        let out = buffer.contents();
        assert!(out.contains("missing required argument 'name'"));
        assert!(out.contains("Usage: greet { name : Who }"));
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped_with_cause() {
        let mut registry = CommandRegistry::new();
        registry
            .register("explode", handler_fn(|_| async { anyhow::bail!("kaboom") }))
            .unwrap();

        let buffer = SharedBuffer::new();
        let mut dispatcher = Dispatcher::with_reporter(registry, reporter(&buffer));

        let code = dispatcher.run(["explode"]).await;

        assert_eq!(code, 1);
        let out = buffer.contents();
        assert!(out.contains("command 'explode' failed"));
        assert!(out.contains("kaboom"));
    }

    #[tokio::test]
    async fn test_global_options_are_stripped() {
        let mut registry = CommandRegistry::new();
        registry
            .register("greet { name? }", handler_fn(|_| async { Ok(()) }))
            .unwrap();

        let buffer = SharedBuffer::new();
        let mut dispatcher = Dispatcher::with_reporter(registry, reporter(&buffer));

        let code = dispatcher
            .run(["--env", "production", "--no-ansi", "greet"])
            .await;

        assert_eq!(code, 0);
        assert_eq!(dispatcher.environment(), Some("production"));
    }

    #[tokio::test]
    async fn test_env_inline_form() {
        let buffer = SharedBuffer::new();
        let mut dispatcher =
            Dispatcher::with_reporter(CommandRegistry::new(), reporter(&buffer));

        dispatcher.run(["--env=staging"]).await;

        assert_eq!(dispatcher.environment(), Some("staging"));
    }

    #[tokio::test]
    async fn test_global_options_after_command_are_not_stripped() {
        let mut registry = CommandRegistry::new();
        registry
            .register("greet { name? }", handler_fn(|_| async { Ok(()) }))
            .unwrap();

        let buffer = SharedBuffer::new();
        let mut dispatcher = Dispatcher::with_reporter(registry, reporter(&buffer));

        // After the command name, `--env` is an ordinary (unknown) flag.
        let code = dispatcher.run(["greet", "--env", "production"]).await;

        assert_eq!(code, 1);
        assert!(buffer.contents().contains("unknown flag '--env'"));
        assert_eq!(dispatcher.environment(), None);
    }
}
