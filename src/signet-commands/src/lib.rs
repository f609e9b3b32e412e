//! Signature-driven command engine for Signet.
//!
//! Commands are declared with a compact signature expression, registered
//! with a handler, and dispatched from raw argv tokens:
//!
//! ```rust,ignore
//! use signet_commands::{CommandRegistry, Dispatcher, handler_fn};
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     "greet { name : Name of the user to greet } { --shout : Uppercase it }",
//!     handler_fn(|invocation| async move {
//!         let name = invocation.argument_str("name").unwrap_or("world");
//!         let greeting = format!("hello {name}");
//!         if invocation.flag_bool("shout") {
//!             println!("{}", greeting.to_uppercase());
//!         } else {
//!             println!("{greeting}");
//!         }
//!         Ok(())
//!     }),
//! )?;
//!
//! let mut dispatcher = Dispatcher::new(registry);
//! let code = dispatcher.run(std::env::args().skip(1)).await;
//! std::process::exit(code);
//! ```
//!
//! # Pipeline
//!
//! - [`signature`] compiles an expression into a [`CommandSignature`] and
//!   rejects structural problems at registration time
//! - [`registry`] maps command names to `(signature, handler)` pairs
//! - [`binder`] reconciles invocation tokens against a signature into a
//!   [`BoundInvocation`]
//! - [`dispatcher`] ties it together and maps outcomes to exit codes
//!
//! Interactive prompting lives in the `signet-prompts` crate; handlers call
//! into it directly for values not supplied on the command line.

pub mod binder;
pub mod dispatcher;
pub mod registry;
pub mod signature;

pub use binder::{BindError, BoundInvocation, BoundValue, bind, camel_key};
pub use dispatcher::{DispatchError, Dispatcher};
pub use registry::{
    CommandRegistry, FnHandler, Handler, RegisteredCommand, RegistryError, handler_fn,
};
pub use signature::{ArgumentSpec, CommandSignature, FlagDefault, FlagSpec, SignatureError};

/// Re-export of common types for application code.
pub mod prelude {
    pub use crate::{
        ArgumentSpec, BindError, BoundInvocation, BoundValue, CommandRegistry, CommandSignature,
        DispatchError, Dispatcher, FlagDefault, FlagSpec, Handler, RegistryError, SignatureError,
        handler_fn,
    };
}
