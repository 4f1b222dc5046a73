//! Bot command handlers.
//!
//! Every command is a [`Handler`] declaring a static [`CommandSpec`]. The
//! [`Registry`] dispatches both prefix messages and slash commands to the
//! same handler through the [`Request`] trait, so handlers never know which
//! entry point was used.

pub mod core;

mod channel;
mod misc;
mod moderation;
mod role;
mod verify;
mod warn;

pub use self::core::{
    Access, ArgValue, CommandArgs, CommandInput, CommandSpec, Context, Handler, Param, ParamKind,
    Registry, Request,
};
