//! Handler trait and command declarations.

use super::args::Param;
use super::context::Context;
use crate::error::BotResult;
use crate::platform::Permission;
use async_trait::async_trait;

/// Who may invoke a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Everyone,
    /// Only the configured admin ids.
    AdminOnly,
    /// Admin ids, or anyone holding the guild permission.
    AdminOr(Permission),
}

/// Static description of a command.
#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
    pub access: Access,
}

impl CommandSpec {
    /// `!warn <user> [reason]`
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{prefix}{}", self.name);
        for param in self.params {
            if param.required {
                usage.push_str(&format!(" <{}>", param.name));
            } else {
                usage.push_str(&format!(" [{}]", param.name));
            }
        }
        usage
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    fn spec(&self) -> &'static CommandSpec;

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::core::args::ParamKind;

    static PARAMS: [Param; 2] = [
        Param::required("user", ParamKind::User, ""),
        Param::optional("reason", ParamKind::String, ""),
    ];

    #[test]
    fn usage_marks_optional_params() {
        let spec = CommandSpec {
            name: "warn",
            description: "",
            params: &PARAMS,
            access: Access::Everyone,
        };
        assert_eq!(spec.usage("!"), "!warn <user> [reason]");
    }
}
