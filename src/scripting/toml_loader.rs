//! Declarative script loader.
//!
//! Reads a module description file and produces bindings whose callbacks
//! reply with templated text. Placeholders: `{sender}`, `{args}` and
//! `{name}` (the entering or leaving user).
//!
//! ```toml
//! name = "greeter"
//! description = "Says hello"
//! on_chat_enter = "Welcome, {name}!"
//!
//! [vars]
//! motto = "be nice"
//!
//! [[command]]
//! match = ["greet", "me"]
//! help = "Greets you"
//! reply = "Hello {sender} {args}"
//! visibility = "public"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{Binding, ScriptBindings, ScriptLoader};
use crate::commands::{Command, Visibility};
use crate::error::LoadError;
use crate::module::callbacks::{self, names};
use crate::network::Recipient;

/// Loads `.toml` module descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlScriptLoader;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    name: Option<String>,
    description: Option<String>,
    global: Option<bool>,
    admin: Option<bool>,
    on_self_chat_enter: Option<String>,
    on_chat_enter: Option<String>,
    on_chat_leave: Option<String>,
    #[serde(default)]
    vars: BTreeMap<String, toml::Value>,
    #[serde(default)]
    command: Vec<CommandDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandDecl {
    #[serde(rename = "match")]
    tokens: MatchTokens,
    #[serde(default)]
    help: String,
    reply: String,
    #[serde(default)]
    visibility: VisibilityDecl,
    #[serde(default)]
    admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatchTokens {
    One(String),
    Many(Vec<String>),
}

impl MatchTokens {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Self::One(s) => s.split_whitespace().map(String::from).collect(),
            Self::Many(v) => v,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VisibilityDecl {
    Public,
    Private,
    #[default]
    Both,
}

impl From<VisibilityDecl> for Visibility {
    fn from(v: VisibilityDecl) -> Self {
        match v {
            VisibilityDecl::Public => Visibility::Public,
            VisibilityDecl::Private => Visibility::Private,
            VisibilityDecl::Both => Visibility::Both,
        }
    }
}

impl ScriptLoader for TomlScriptLoader {
    fn load(&self, path: &Path) -> Result<ScriptBindings, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ScriptFile = toml::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        into_bindings(file, path)
    }
}

fn into_bindings(file: ScriptFile, path: &Path) -> Result<ScriptBindings, LoadError> {
    let mut bindings = ScriptBindings::new();

    if let Some(name) = file.name {
        bindings.bind("Name", Binding::Value(name.into()));
    }
    if let Some(description) = file.description {
        bindings.bind("Description", Binding::Value(description.into()));
    }
    if let Some(global) = file.global {
        bindings.bind("Global", Binding::Value(global.into()));
    }
    if let Some(admin) = file.admin {
        bindings.bind("Admin", Binding::Value(admin.into()));
    }
    for (key, value) in file.vars {
        bindings.bind(key, Binding::Value(value));
    }

    if let Some(template) = file.on_self_chat_enter {
        let template: Arc<str> = template.into();
        bindings.bind(
            names::SELF_CHAT_ENTER,
            Binding::SelfChatEnter(callbacks::on_self_chat_enter(move |ctx, ev| {
                let text = render(&template, &[]);
                async move {
                    ctx.say(&text, Some(Recipient::Room(ev.room))).await?;
                    Ok(())
                }
            })),
        );
    }

    if let Some(template) = file.on_chat_enter {
        let template: Arc<str> = template.into();
        bindings.bind(
            names::CHAT_ENTER,
            Binding::ChatEnter(callbacks::on_chat_enter(move |ctx, ev| {
                let text = render(&template, &[("name", ev.name.clone())]);
                async move {
                    if let Some(room) = ev.room {
                        ctx.say(&text, Some(Recipient::Room(room))).await?;
                    }
                    Ok(())
                }
            })),
        );
    }

    if let Some(template) = file.on_chat_leave {
        let template: Arc<str> = template.into();
        bindings.bind(
            names::CHAT_LEAVE,
            Binding::ChatLeave(callbacks::on_chat_leave(move |ctx, ev| {
                let name = ctx
                    .users()
                    .user(ev.user)
                    .map(|u| u.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| ev.user.to_string());
                let text = render(&template, &[("name", name)]);
                async move {
                    ctx.say(&text, Some(Recipient::Room(ev.room))).await?;
                    Ok(())
                }
            })),
        );
    }

    for (idx, decl) in file.command.into_iter().enumerate() {
        let tokens = decl.tokens.into_tokens();
        if tokens.is_empty() {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                reason: format!("command #{} has an empty match", idx + 1),
            });
        }

        let template: Arc<str> = decl.reply.into();
        let callback = callbacks::command(move |ctx, msg, args| {
            let text = render(
                &template,
                &[("sender", msg.sender().to_string()), ("args", args.join(" "))],
            );
            async move {
                ctx.reply(&msg, &text).await?;
                Ok(())
            }
        });

        let mut command =
            Command::new(tokens, decl.help, callback).with_visibility(decl.visibility.into());
        if decl.admin {
            command = command.admin_only();
        }
        bindings.add_command(command);
    }

    debug!(path = %path.display(), "Parsed script bindings");
    Ok(bindings)
}

/// Substitute `{key}` placeholders.
fn render(template: &str, values: &[(&str, String)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Module, Scope};
    use tempfile::tempdir;

    const GREETER: &str = r#"
name = "greeter"
description = "Says hello"
admin = false
on_chat_enter = "Welcome, {name}!"

[vars]
motto = "be nice"

[[command]]
match = ["greet", "me"]
help = "Greets you"
reply = "Hello {sender} {args}"
visibility = "public"

[[command]]
match = "shutdown"
reply = "bye"
admin = true
"#;

    #[test]
    fn test_render() {
        assert_eq!(
            render("hi {name}, {name}! {other}", &[("name", "bob".into())]),
            "hi bob, bob! {other}"
        );
    }

    #[test]
    fn test_load_declarative_module() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("greeter.toml");
        std::fs::write(&path, GREETER).unwrap();

        let module = Module::from_script(&TomlScriptLoader, &path, Scope::Global).unwrap();
        assert_eq!(module.name(), "greeter");
        assert_eq!(module.description(), "Says hello");
        assert_eq!(module.callbacks().bound(), vec!["OnChatEnter"]);
        assert_eq!(module.variables()["motto"], toml::Value::String("be nice".into()));

        let commands: Vec<_> = module.commands().iter().collect();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].tokens(), ["greet", "me"]);
        assert_eq!(commands[0].visibility(), Visibility::Public);
        assert!(!commands[0].is_admin_only());
        assert_eq!(commands[1].tokens(), ["shutdown"]);
        assert!(commands[1].is_admin_only());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = TomlScriptLoader
            .load(&dir.path().join("nope.toml"))
            .unwrap_err();
        assert_eq!(err.error_code(), "script_read");
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "name = \n[[command]\n").unwrap();
        let err = TomlScriptLoader.load(&path).unwrap_err();
        assert_eq!(err.error_code(), "script_parse");
    }

    #[test]
    fn test_empty_match_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "[[command]]\nmatch = []\nreply = \"x\"\n").unwrap();
        let err = TomlScriptLoader.load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { reason, .. } if reason.contains("#1")));
    }
}
