//! Role management handlers: createrole, deleterole, addrole, removerole.

use super::core::{Access, CommandSpec, Context, Handler, Param, ParamKind};
use crate::error::{BotError, BotResult};
use crate::platform::{NewRole, Permission};
use async_trait::async_trait;

/// Parse a `#RRGGBB` color into a 24-bit value.
pub fn parse_color(raw: &str) -> BotResult<u32> {
    let invalid = || BotError::Validation("Invalid color format. Use hex like `#ff5733`.".to_string());
    let hex = raw.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u32::from_str_radix(hex, 16).map_err(|_| invalid())
}

static CREATE_ROLE_PARAMS: [Param; 4] = [
    Param::required("name", ParamKind::String, "Name of the role"),
    Param::optional("color", ParamKind::String, "Hex color, e.g. #ff5733 (default: #000000)"),
    Param::optional("hoist", ParamKind::Bool, "Show members separately"),
    Param::optional("mentionable", ParamKind::Bool, "Allow anyone to mention the role"),
];

static CREATE_ROLE: CommandSpec = CommandSpec {
    name: "createrole",
    description: "Create a new role",
    params: &CREATE_ROLE_PARAMS,
    access: Access::AdminOr(Permission::ManageRoles),
};

pub struct CreateRoleHandler;

#[async_trait]
impl Handler for CreateRoleHandler {
    fn spec(&self) -> &'static CommandSpec {
        &CREATE_ROLE
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let role = NewRole {
            name: ctx.args.string("name")?.to_string(),
            color: parse_color(ctx.args.opt_string("color").unwrap_or("#000000"))?,
            hoist: ctx.args.opt_bool("hoist").unwrap_or(false),
            mentionable: ctx.args.opt_bool("mentionable").unwrap_or(false),
        };

        let id = ctx.gateway.create_role(ctx.guild_id, &role).await?;
        ctx.reply(&format!("Role {} has been created.", id.mention()))
            .await?;
        ctx.log_action(&format!(
            "**Role Created** {} | Moderator: {}",
            role.name,
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static DELETE_ROLE_PARAMS: [Param; 1] = [Param::required(
    "role",
    ParamKind::Role,
    "Role to delete",
)];

static DELETE_ROLE: CommandSpec = CommandSpec {
    name: "deleterole",
    description: "Delete a role",
    params: &DELETE_ROLE_PARAMS,
    access: Access::AdminOr(Permission::ManageRoles),
};

pub struct DeleteRoleHandler;

#[async_trait]
impl Handler for DeleteRoleHandler {
    fn spec(&self) -> &'static CommandSpec {
        &DELETE_ROLE
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let role = ctx.args.role("role")?;
        ctx.gateway.delete_role(ctx.guild_id, role).await?;
        ctx.reply(&format!("Role `{role}` has been deleted.")).await?;
        ctx.log_action(&format!(
            "**Role Deleted** `{role}` | Moderator: {}",
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static MEMBER_ROLE_PARAMS: [Param; 2] = [
    Param::required("user", ParamKind::User, "Member to update"),
    Param::required("role", ParamKind::Role, "Role to grant or revoke"),
];

static ADD_ROLE: CommandSpec = CommandSpec {
    name: "addrole",
    description: "Add a role to a user",
    params: &MEMBER_ROLE_PARAMS,
    access: Access::AdminOr(Permission::ManageRoles),
};

pub struct AddRoleHandler;

#[async_trait]
impl Handler for AddRoleHandler {
    fn spec(&self) -> &'static CommandSpec {
        &ADD_ROLE
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let user = ctx.args.user("user")?;
        let role = ctx.args.role("role")?;
        ctx.gateway.add_role(ctx.guild_id, user, role).await?;
        ctx.reply(&format!(
            "Added role {} to {}.",
            role.mention(),
            user.mention()
        ))
        .await?;
        ctx.log_action(&format!(
            "**Role Added** {} to {} | Moderator: {}",
            role.mention(),
            user.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static REMOVE_ROLE: CommandSpec = CommandSpec {
    name: "removerole",
    description: "Remove a role from a user",
    params: &MEMBER_ROLE_PARAMS,
    access: Access::AdminOr(Permission::ManageRoles),
};

pub struct RemoveRoleHandler;

#[async_trait]
impl Handler for RemoveRoleHandler {
    fn spec(&self) -> &'static CommandSpec {
        &REMOVE_ROLE
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let user = ctx.args.user("user")?;
        let role = ctx.args.role("role")?;
        ctx.gateway.remove_role(ctx.guild_id, user, role).await?;
        ctx.reply(&format!(
            "Removed role {} from {}.",
            role.mention(),
            user.mention()
        ))
        .await?;
        ctx.log_action(&format!(
            "**Role Removed** {} from {} | Moderator: {}",
            role.mention(),
            user.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff5733").unwrap(), 0xff5733);
        assert_eq!(parse_color("#000000").unwrap(), 0);
        assert_eq!(parse_color("#FFFFFF").unwrap(), 0xffffff);
    }

    #[test]
    fn test_parse_color_rejects_malformed() {
        for raw in ["ff5733", "#ff573", "#ff57333", "#gg0000", "#+f5733", ""] {
            assert!(
                matches!(parse_color(raw), Err(BotError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
