//! Command handler registry and dispatch.
//!
//! The `Registry` owns every command handler, checks access, binds arguments,
//! and turns handler failures into replies. It also keeps command usage
//! counters.

use super::args::CommandArgs;
use super::context::Context;
use super::request::Request;
use super::traits::{Access, CommandSpec, Handler};
use crate::error::BotError;
use crate::handlers::{
    channel::{CreateChannelHandler, DeleteChannelHandler, SlowmodeHandler},
    misc::AboutHandler,
    moderation::{
        BanHandler, ClearHandler, HideHandler, KickHandler, LockHandler, TimeoutHandler,
        UnbanHandler, UnhideHandler, UnlockHandler,
    },
    role::{AddRoleHandler, CreateRoleHandler, DeleteRoleHandler, RemoveRoleHandler},
    verify::{AdminVerifyHandler, CacheUnverifiedHandler, VerifyHandler},
    warn::{ClearWarningsHandler, WarnHandler, WarningsHandler},
};
use crate::platform::Gateway;
use crate::state::Session;
use crate::telemetry::{CommandTimer, spans};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, error, warn};

/// How the arguments arrived.
#[derive(Debug, Clone)]
pub enum CommandInput {
    /// Prefix command: the text after the command name.
    Text(String),
    /// Slash command: already typed by the platform.
    Parsed(CommandArgs),
}

const ACCESS_DENIED: &str = "You do not have permission to use this command.";
const GUILD_ONLY: &str = "This command cannot be used in private messages.";

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    /// Command usage counters
    command_counts: HashMap<&'static str, Arc<AtomicU64>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let all: Vec<Box<dyn Handler>> = vec![
            // Verification
            Box::new(VerifyHandler),
            Box::new(AdminVerifyHandler),
            Box::new(CacheUnverifiedHandler),
            // Warnings
            Box::new(WarnHandler),
            Box::new(WarningsHandler),
            Box::new(ClearWarningsHandler),
            // Member moderation
            Box::new(BanHandler),
            Box::new(UnbanHandler),
            Box::new(KickHandler),
            Box::new(TimeoutHandler),
            // Channel moderation
            Box::new(HideHandler),
            Box::new(UnhideHandler),
            Box::new(LockHandler),
            Box::new(UnlockHandler),
            Box::new(ClearHandler),
            // Roles
            Box::new(CreateRoleHandler),
            Box::new(DeleteRoleHandler),
            Box::new(AddRoleHandler),
            Box::new(RemoveRoleHandler),
            // Channels
            Box::new(CreateChannelHandler),
            Box::new(DeleteChannelHandler),
            Box::new(SlowmodeHandler),
            // Misc
            Box::new(AboutHandler),
        ];

        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();
        for handler in all {
            handlers.insert(handler.spec().name, handler);
        }

        let mut command_counts = HashMap::new();
        for &cmd in handlers.keys() {
            command_counts.insert(cmd, Arc::new(AtomicU64::new(0)));
        }

        Self {
            handlers,
            command_counts,
        }
    }

    /// Every command declaration, sorted by name.
    pub fn specs(&self) -> Vec<&'static CommandSpec> {
        let mut specs: Vec<_> = self.handlers.values().map(|h| h.spec()).collect();
        specs.sort_by_key(|spec| spec.name);
        specs
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Command usage counts, most used first.
    pub fn get_command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (*cmd, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    /// Run a command and report its outcome through `request`.
    ///
    /// Unknown command names are ignored, since prefix messages that merely
    /// start with the prefix are not necessarily commands.
    pub async fn dispatch(
        &self,
        session: &Session,
        gateway: &dyn Gateway,
        request: &mut dyn Request,
        name: &str,
        input: CommandInput,
    ) {
        let name = name.to_ascii_lowercase();
        let Some(handler) = self.handlers.get(name.as_str()) else {
            debug!(command = %name, "Unknown command");
            crate::metrics::record_command_error("unknown", "unknown_command");
            return;
        };
        let spec = handler.spec();

        if let Some(counter) = self.command_counts.get(spec.name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let Some(guild_id) = request.guild_id() else {
            send_reply(request, GUILD_ONLY).await;
            return;
        };

        let span = spans::command(spec.name, request.requester_id(), guild_id, request.channel_id());
        let _timer = CommandTimer::new(spec.name);

        async {
            let args = match input {
                CommandInput::Parsed(args) => Ok(args),
                CommandInput::Text(text) => CommandArgs::parse(spec.params, &text),
            };
            let args = match args {
                Ok(args) => args,
                Err(e) => {
                    report_error(session, request, spec, &e).await;
                    return;
                }
            };

            match check_access(session, gateway, request, guild_id, spec.access).await {
                Ok(true) => {}
                Ok(false) => {
                    crate::metrics::record_command_error(spec.name, "access_denied");
                    send_reply(request, ACCESS_DENIED).await;
                    return;
                }
                Err(e) => {
                    report_error(session, request, spec, &e).await;
                    return;
                }
            }

            let result = {
                let mut ctx = Context::new(session, gateway, &mut *request, guild_id, args);
                handler.handle(&mut ctx).await
            };
            if let Err(e) = result {
                report_error(session, request, spec, &e).await;
            }
        }
        .instrument(span)
        .await;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

async fn check_access(
    session: &Session,
    gateway: &dyn Gateway,
    request: &dyn Request,
    guild_id: crate::platform::GuildId,
    access: Access,
) -> Result<bool, BotError> {
    let requester = request.requester_id();
    let is_admin = session.config.bot.is_admin(requester);
    match access {
        Access::Everyone => Ok(true),
        Access::AdminOnly => Ok(is_admin),
        Access::AdminOr(permission) => {
            if is_admin {
                return Ok(true);
            }
            Ok(gateway.has_permission(guild_id, requester, permission).await?)
        }
    }
}

async fn report_error(session: &Session, request: &mut dyn Request, spec: &CommandSpec, e: &BotError) {
    crate::metrics::record_command_error(spec.name, e.error_code());
    if e.is_unexpected() {
        error!(command = spec.name, error = %e, "Command failed");
    } else {
        debug!(command = spec.name, error = %e, "Command rejected");
    }

    let mut message = e.user_message();
    if matches!(e, BotError::MissingArgument(_) | BotError::BadArgument { .. }) {
        message.push_str(&format!(
            "\nUsage: `{}`",
            spec.usage(&session.config.bot.prefix)
        ));
    }
    send_reply(request, &message).await;
}

/// Private reply. Adapters turn a second reply into a follow-up.
async fn send_reply(request: &mut dyn Request, content: &str) {
    if let Err(e) = request.reply(content, true).await {
        warn!(error = %e, "Failed to send reply");
    }
}
