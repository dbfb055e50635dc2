//! `!admin`: admin list management. Admin-only.

use std::sync::Arc;

use crate::error::ModuleError;
use crate::module::callbacks::command;
use crate::module::{Module, Scope};
use crate::state::SteamId;

pub fn module(scope: Scope) -> Result<Module, ModuleError> {
    Module::builder("admin")
        .description("Manages bot admins")
        .scope(scope)
        .admin(true)
        .command(
            ["admin", "add"],
            "Promote a user to admin: admin add <steamid>",
            command(|ctx, msg, args| async move {
                let Some(raw) = args.first() else {
                    let usage = format!("Usage: {}admin add <steamid>", ctx.command_char());
                    ctx.reply(&msg, &usage).await?;
                    return Ok(());
                };

                let text = match raw.parse::<SteamId>() {
                    Err(e) => format!("Not a valid SteamID ({e})."),
                    Ok(id) => {
                        // Promotion syncs the admin file to disk.
                        let users = Arc::clone(ctx.users());
                        if tokio::task::spawn_blocking(move || users.promote(id)).await?? {
                            format!("{id} is now an admin.")
                        } else {
                            format!("{id} is already an admin.")
                        }
                    }
                };
                ctx.reply(&msg, &text).await?;
                Ok(())
            }),
        )
        .command(
            ["admin", "list"],
            "List admins",
            command(|ctx, msg, _args| async move {
                let admins = ctx.users().admins();
                let text = if admins.is_empty() {
                    "No admins.".to_string()
                } else {
                    let ids: Vec<String> = admins.iter().map(SteamId::to_string).collect();
                    format!("Admins: {}", ids.join(", "))
                };
                ctx.reply(&msg, &text).await?;
                Ok(())
            }),
        )
        .build()
}
