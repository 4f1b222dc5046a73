//! Command parameter declarations and parsed arguments.
//!
//! Each command declares its parameters once. Slash commands are registered
//! from the declaration and arrive already typed; prefix commands are parsed
//! from the message text against the same declaration.

use crate::error::{BotError, BotResult};
use crate::platform::{ChannelId, RoleId, UserId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Bool,
    User,
    Channel,
    Role,
}

/// One declared command parameter.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl Param {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Bool(bool),
    User(UserId),
    Channel(ChannelId),
    Role(RoleId),
}

/// Arguments keyed by declared parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    values: HashMap<&'static str, ArgValue>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: ArgValue) {
        self.values.insert(name, value);
    }

    pub fn with(mut self, name: &'static str, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parse prefix-command text against `params`.
    ///
    /// Tokens are split on whitespace and bound in declaration order. A
    /// trailing string parameter takes the rest of the line.
    pub fn parse(params: &'static [Param], input: &str) -> BotResult<Self> {
        let greedy = params
            .last()
            .filter(|p| p.kind == ParamKind::String)
            .map(|_| params.len() - 1);
        let mut args = Self::new();
        let mut rest = input.trim();

        for (i, param) in params.iter().enumerate() {
            if rest.is_empty() {
                if param.required {
                    return Err(BotError::MissingArgument(param.name));
                }
                continue;
            }
            let token = if Some(i) == greedy {
                std::mem::take(&mut rest)
            } else {
                let (token, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                rest = tail.trim_start();
                token
            };
            args.insert(param.name, parse_value(param, token)?);
        }
        Ok(args)
    }

    pub fn string(&self, name: &'static str) -> BotResult<&str> {
        self.opt_string(name).ok_or(BotError::MissingArgument(name))
    }

    pub fn opt_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &'static str) -> BotResult<i64> {
        self.opt_integer(name).ok_or(BotError::MissingArgument(name))
    }

    pub fn opt_integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn opt_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn user(&self, name: &'static str) -> BotResult<UserId> {
        self.opt_user(name).ok_or(BotError::MissingArgument(name))
    }

    pub fn opt_user(&self, name: &str) -> Option<UserId> {
        match self.values.get(name) {
            Some(ArgValue::User(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn channel(&self, name: &'static str) -> BotResult<ChannelId> {
        self.opt_channel(name).ok_or(BotError::MissingArgument(name))
    }

    pub fn opt_channel(&self, name: &str) -> Option<ChannelId> {
        match self.values.get(name) {
            Some(ArgValue::Channel(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn role(&self, name: &'static str) -> BotResult<RoleId> {
        match self.values.get(name) {
            Some(ArgValue::Role(id)) => Ok(*id),
            _ => Err(BotError::MissingArgument(name)),
        }
    }
}

fn parse_value(param: &Param, token: &str) -> BotResult<ArgValue> {
    let bad = || BotError::BadArgument {
        name: param.name,
        value: token.to_string(),
    };
    let value = match param.kind {
        ParamKind::String => ArgValue::String(token.to_string()),
        ParamKind::Integer => ArgValue::Integer(token.parse().map_err(|_| bad())?),
        ParamKind::Bool => ArgValue::Bool(parse_bool(token).ok_or_else(bad)?),
        ParamKind::User => ArgValue::User(UserId(parse_mention(token, &["@!", "@"]).ok_or_else(bad)?)),
        ParamKind::Channel => ArgValue::Channel(ChannelId(parse_mention(token, &["#"]).ok_or_else(bad)?)),
        ParamKind::Role => ArgValue::Role(RoleId(parse_mention(token, &["@&"]).ok_or_else(bad)?)),
    };
    Ok(value)
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Accept `<SIGIL id>` for any of `sigils`, or a bare numeric id.
fn parse_mention(token: &str, sigils: &[&str]) -> Option<u64> {
    if let Ok(id) = token.parse() {
        return Some(id);
    }
    let inner = token.strip_prefix('<')?.strip_suffix('>')?;
    sigils
        .iter()
        .find_map(|sigil| inner.strip_prefix(sigil))
        .and_then(|id| id.parse().ok())
}
