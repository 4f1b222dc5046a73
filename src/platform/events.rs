//! serenity event handler and request adapters.
//!
//! Prefix messages and slash interactions both end up in
//! [`Registry::dispatch`]; the two [`Request`] adapters here hide how each one
//! is answered.

use super::discord::DiscordGateway;
use super::{ChannelId, GatewayError, GatewayResult, GuildId, RoleId, UserId};
use crate::handlers::{ArgValue, CommandArgs, CommandInput, CommandSpec, ParamKind, Registry, Request};
use crate::services::{on_member_join, spawn_sweeper};
use crate::state::Session;
use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context as SerenityContext, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, EventHandler, Interaction, Member, Message,
    Ready, ResolvedOption, ResolvedValue,
};
use serenity::http::Http;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Platform limit on message length, in characters.
const MAX_CONTENT: usize = 2000;

fn truncate(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT) {
        Some((end, _)) => content[..end].to_string(),
        None => content.to_string(),
    }
}

fn map_err(action: &str, e: serenity::Error) -> GatewayError {
    GatewayError::Other(format!("{action}: {e}"))
}

// ============================================================================
// Prefix messages
// ============================================================================

/// A prefix command typed in a channel. Every reply is a plain channel
/// message, so `ephemeral` is ignored.
pub struct MessageRequest {
    http: Arc<Http>,
    author: UserId,
    guild: Option<GuildId>,
    channel: ChannelId,
    channel_ref: serenity::all::ChannelId,
}

impl MessageRequest {
    pub fn new(http: Arc<Http>, message: &Message) -> Self {
        Self {
            http,
            author: UserId(message.author.id.get()),
            guild: message.guild_id.map(|g| GuildId(g.get())),
            channel: ChannelId(message.channel_id.get()),
            channel_ref: message.channel_id,
        }
    }

    async fn send(&self, content: &str) -> GatewayResult<()> {
        self.channel_ref
            .send_message(self.http.as_ref(), CreateMessage::new().content(truncate(content)))
            .await
            .map(|_| ())
            .map_err(|e| map_err("send reply", e))
    }
}

#[async_trait]
impl Request for MessageRequest {
    fn requester_id(&self) -> UserId {
        self.author
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild
    }

    fn channel_id(&self) -> ChannelId {
        self.channel
    }

    async fn reply(&mut self, content: &str, _ephemeral: bool) -> GatewayResult<()> {
        self.send(content).await
    }

    async fn defer_reply(&mut self, _ephemeral: bool) -> GatewayResult<()> {
        self.channel_ref
            .broadcast_typing(self.http.as_ref())
            .await
            .map_err(|e| map_err("broadcast typing", e))
    }

    async fn follow_up(&mut self, content: &str, _ephemeral: bool) -> GatewayResult<()> {
        self.send(content).await
    }
}

// ============================================================================
// Slash interactions
// ============================================================================

/// A slash command invocation.
pub struct InteractionRequest {
    http: Arc<Http>,
    command: CommandInteraction,
    /// Set once the initial response (or defer) has gone out.
    responded: bool,
}

impl InteractionRequest {
    pub fn new(http: Arc<Http>, command: CommandInteraction) -> Self {
        Self {
            http,
            command,
            responded: false,
        }
    }
}

#[async_trait]
impl Request for InteractionRequest {
    fn requester_id(&self) -> UserId {
        UserId(self.command.user.id.get())
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.command.guild_id.map(|g| GuildId(g.get()))
    }

    fn channel_id(&self) -> ChannelId {
        ChannelId(self.command.channel_id.get())
    }

    async fn reply(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()> {
        if self.responded {
            return self.follow_up(content, ephemeral).await;
        }
        let message = CreateInteractionResponseMessage::new()
            .content(truncate(content))
            .ephemeral(ephemeral);
        self.command
            .create_response(self.http.as_ref(), CreateInteractionResponse::Message(message))
            .await
            .map_err(|e| map_err("respond to interaction", e))?;
        self.responded = true;
        Ok(())
    }

    async fn defer_reply(&mut self, ephemeral: bool) -> GatewayResult<()> {
        if self.responded {
            return Ok(());
        }
        let message = CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.command
            .create_response(self.http.as_ref(), CreateInteractionResponse::Defer(message))
            .await
            .map_err(|e| map_err("defer interaction", e))?;
        self.responded = true;
        Ok(())
    }

    async fn follow_up(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()> {
        if !self.responded {
            return self.reply(content, ephemeral).await;
        }
        let followup = CreateInteractionResponseFollowup::new()
            .content(truncate(content))
            .ephemeral(ephemeral);
        self.command
            .create_followup(self.http.as_ref(), followup)
            .await
            .map(|_| ())
            .map_err(|e| map_err("send follow-up", e))
    }
}

/// Typed value for a declared parameter, if the resolved option matches it.
fn resolve_value(kind: ParamKind, value: &ResolvedValue<'_>) -> Option<ArgValue> {
    let value = match (kind, value) {
        (ParamKind::String, ResolvedValue::String(s)) => ArgValue::String((*s).to_string()),
        (ParamKind::Integer, ResolvedValue::Integer(n)) => ArgValue::Integer(*n),
        (ParamKind::Bool, ResolvedValue::Boolean(b)) => ArgValue::Bool(*b),
        (ParamKind::User, ResolvedValue::User(user, _)) => ArgValue::User(UserId(user.id.get())),
        (ParamKind::Channel, ResolvedValue::Channel(channel)) => {
            ArgValue::Channel(ChannelId(channel.id.get()))
        }
        (ParamKind::Role, ResolvedValue::Role(role)) => ArgValue::Role(RoleId(role.id.get())),
        _ => return None,
    };
    Some(value)
}

/// Bind resolved slash options to the command's declared parameters.
///
/// Undeclared or mistyped options are dropped; the handler then reports
/// them as missing.
fn bind_options(spec: &CommandSpec, options: &[ResolvedOption<'_>]) -> CommandArgs {
    let mut args = CommandArgs::new();
    for option in options {
        if let Some(param) = spec.params.iter().find(|p| p.name == option.name)
            && let Some(value) = resolve_value(param.kind, &option.value)
        {
            args.insert(param.name, value);
        }
    }
    args
}

fn option_type(kind: ParamKind) -> CommandOptionType {
    match kind {
        ParamKind::String => CommandOptionType::String,
        ParamKind::Integer => CommandOptionType::Integer,
        ParamKind::Bool => CommandOptionType::Boolean,
        ParamKind::User => CommandOptionType::User,
        ParamKind::Channel => CommandOptionType::Channel,
        ParamKind::Role => CommandOptionType::Role,
    }
}

/// Slash command definition for a command declaration.
pub fn slash_command(spec: &CommandSpec) -> CreateCommand {
    spec.params.iter().fold(
        CreateCommand::new(spec.name).description(spec.description),
        |command, param| {
            command.add_option(
                CreateCommandOption::new(option_type(param.kind), param.name, param.description)
                    .required(param.required),
            )
        },
    )
}

// ============================================================================
// Event handler
// ============================================================================

/// serenity event handler.
pub struct Bot {
    session: Arc<Session>,
    registry: Arc<Registry>,
    sweeper_started: AtomicBool,
}

impl Bot {
    pub fn new(session: Arc<Session>, registry: Arc<Registry>) -> Self {
        Self {
            session,
            registry,
            sweeper_started: AtomicBool::new(false),
        }
    }

    fn is_home_guild(&self, guild: Option<GuildId>) -> bool {
        guild.is_none_or(|g| g == self.session.config.bot.guild_id)
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: SerenityContext, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");

        if self.session.config.bot.register_slash_commands {
            let guild = serenity::all::GuildId::new(self.session.config.bot.guild_id.get());
            let commands: Vec<CreateCommand> =
                self.registry.specs().into_iter().map(slash_command).collect();
            let count = commands.len();
            match guild.set_commands(&ctx.http, commands).await {
                Ok(_) => info!(count, "Registered slash commands"),
                Err(e) => error!(error = %e, "Failed to register slash commands"),
            }
        }

        // Ready fires again on reconnect.
        if !self.sweeper_started.swap(true, Ordering::SeqCst) {
            let gateway = Arc::new(DiscordGateway::new(ctx.http.clone()));
            spawn_sweeper(self.session.clone(), gateway);
            info!("Welcome prompt sweeper started");
        }
    }

    async fn message(&self, ctx: SerenityContext, message: Message) {
        if message.author.bot {
            return;
        }
        let prefix = self.session.config.bot.prefix.as_str();
        let Some(body) = message.content.strip_prefix(prefix) else {
            return;
        };
        let (name, rest) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        if name.is_empty() {
            return;
        }

        let mut request = MessageRequest::new(ctx.http.clone(), &message);
        if !self.is_home_guild(request.guild_id()) {
            debug!(guild = ?request.guild_id(), "Ignoring command from another guild");
            return;
        }
        let gateway = DiscordGateway::new(ctx.http.clone());
        self.registry
            .dispatch(
                &self.session,
                &gateway,
                &mut request,
                name,
                CommandInput::Text(rest.to_string()),
            )
            .await;
    }

    async fn interaction_create(&self, ctx: SerenityContext, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let name = command.data.name.clone();
        let input = self
            .registry
            .specs()
            .into_iter()
            .find(|spec| spec.name == name)
            .map(|spec| bind_options(spec, &command.data.options()))
            .unwrap_or_default();

        let mut request = InteractionRequest::new(ctx.http.clone(), command);
        if !self.is_home_guild(request.guild_id()) {
            debug!(guild = ?request.guild_id(), "Ignoring interaction from another guild");
            return;
        }
        let gateway = DiscordGateway::new(ctx.http.clone());
        self.registry
            .dispatch(
                &self.session,
                &gateway,
                &mut request,
                &name,
                CommandInput::Parsed(input),
            )
            .await;
    }

    async fn guild_member_addition(&self, ctx: SerenityContext, member: Member) {
        if member.user.bot {
            return;
        }
        let guild = GuildId(member.guild_id.get());
        if !self.is_home_guild(Some(guild)) {
            return;
        }
        let user = UserId(member.user.id.get());
        let gateway = DiscordGateway::new(ctx.http.clone());
        if let Err(e) = on_member_join(&self.session, &gateway, guild, user, Utc::now()).await {
            warn!(user = %user, error = %e, "Failed to welcome new member");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{Access, Param};

    static PARAMS: [Param; 2] = [
        Param::required("user", ParamKind::User, "Member"),
        Param::optional("reason", ParamKind::String, "Reason"),
    ];

    static SPEC: CommandSpec = CommandSpec {
        name: "warn",
        description: "Warn a member",
        params: &PARAMS,
        access: Access::Everyone,
    };

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_CONTENT + 10);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CONTENT);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn resolve_value_requires_matching_kind() {
        assert_eq!(
            resolve_value(ParamKind::String, &ResolvedValue::String("spam")),
            Some(ArgValue::String("spam".to_string()))
        );
        assert_eq!(
            resolve_value(ParamKind::Bool, &ResolvedValue::Boolean(false)),
            Some(ArgValue::Bool(false))
        );
        assert_eq!(resolve_value(ParamKind::Integer, &ResolvedValue::String("5")), None);
    }

    #[test]
    fn slash_command_builds_for_every_kind() {
        let _ = slash_command(&SPEC);
        assert_eq!(option_type(ParamKind::User), CommandOptionType::User);
    }
}
