//! Core handler infrastructure.
//!
//! This module contains the fundamental types for the command handler system:
//! the handler registry, the context passed to handlers, parameter
//! declarations, and the [`Request`] abstraction over prefix and slash
//! invocations.

pub mod args;
pub mod context;
pub mod registry;
pub mod request;
pub mod traits;

pub use args::{ArgValue, CommandArgs, Param, ParamKind};
pub use context::Context;
pub use registry::{CommandInput, Registry};
pub use request::Request;
pub use traits::{Access, CommandSpec, Handler};
