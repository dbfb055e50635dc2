//! `!help`: lists modules and their commands.

use crate::commands::Visibility;
use crate::error::ModuleError;
use crate::module::callbacks::command;
use crate::module::{Module, ModuleInfo, Scope};

pub fn module(scope: Scope) -> Result<Module, ModuleError> {
    Module::builder("help")
        .description("Lists modules and their commands")
        .scope(scope)
        .command(
            ["help"],
            "List modules, or the commands of one module",
            command(|ctx, msg, args| async move {
                let is_admin = ctx.users().is_admin(msg.sender());
                let prefix = ctx.command_char();

                let text = match args.first() {
                    None => overview(&ctx.modules(), prefix, is_admin),
                    Some(name) => match ctx.module(name) {
                        Some(info) if !info.admin || is_admin => {
                            details(info, prefix, is_admin, msg.room().is_some())
                        }
                        _ => format!("No module named '{name}'."),
                    },
                };
                ctx.reply(&msg, &text).await?;
                Ok(())
            }),
        )
        .build()
}

fn overview(modules: &[&ModuleInfo], prefix: &str, is_admin: bool) -> String {
    let names: Vec<&str> = modules
        .iter()
        .filter(|m| !m.admin || is_admin)
        .map(|m| m.name.as_str())
        .collect();
    format!(
        "Modules: {}. Use {prefix}help <module> for its commands.",
        names.join(", ")
    )
}

fn details(info: &ModuleInfo, prefix: &str, is_admin: bool, in_room: bool) -> String {
    let mut lines = vec![if info.description.is_empty() {
        info.name.clone()
    } else {
        format!("{}: {}", info.name, info.description)
    }];

    for cmd in &info.commands {
        if cmd.admin_only && !is_admin {
            continue;
        }
        let mut line = format!("  {}", cmd.usage(prefix));
        if !cmd.help.is_empty() {
            line.push_str(" - ");
            line.push_str(&cmd.help);
        }
        if !cmd.visibility.admits(in_room) {
            line.push_str(match cmd.visibility {
                Visibility::Public => " (rooms only)",
                _ => " (direct messages only)",
            });
        }
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::CommandInfo;

    fn info() -> ModuleInfo {
        ModuleInfo {
            name: "quotes".into(),
            description: "Remembers quotes".into(),
            scope: Scope::Global,
            admin: false,
            variables: Default::default(),
            commands: vec![
                CommandInfo {
                    tokens: vec!["quote".into()],
                    help: "Random quote".into(),
                    visibility: Visibility::Both,
                    admin_only: false,
                },
                CommandInfo {
                    tokens: vec!["quote".into(), "add".into()],
                    help: "Save a quote".into(),
                    visibility: Visibility::Private,
                    admin_only: false,
                },
                CommandInfo {
                    tokens: vec!["quote".into(), "purge".into()],
                    help: String::new(),
                    visibility: Visibility::Both,
                    admin_only: true,
                },
            ],
        }
    }

    #[test]
    fn test_overview_hides_admin_modules() {
        let public = info();
        let mut secret = info();
        secret.name = "admin".into();
        secret.admin = true;
        let modules = [&public, &secret];

        assert_eq!(
            overview(&modules, "!", false),
            "Modules: quotes. Use !help <module> for its commands."
        );
        assert!(overview(&modules, "!", true).starts_with("Modules: quotes, admin."));
    }

    #[test]
    fn test_details() {
        let text = details(&info(), "!", false, true);
        assert_eq!(
            text,
            "quotes: Remembers quotes\n  !quote - Random quote\n  !quote add - Save a quote (direct messages only)"
        );
        assert!(details(&info(), "!", true, false).ends_with("  !quote purge"));
    }
}
