//! Building modules from script bindings.

use std::path::Path;

use tracing::{debug, info, warn};

use super::callbacks::names;
use super::{Module, ModuleBuilder, Scope};
use crate::error::LoadError;
use crate::scripting::{Binding, ScriptBindings, ScriptLoader};

const VAR_NAME: &str = "Name";
const VAR_DESCRIPTION: &str = "Description";
const VAR_GLOBAL: &str = "Global";
const VAR_ADMIN: &str = "Admin";

impl Module {
    /// Load a scripted module.
    ///
    /// `scope` comes from the host configuration. Any loader failure aborts
    /// this module only.
    pub fn from_script(
        loader: &dyn ScriptLoader,
        path: &Path,
        scope: Scope,
    ) -> Result<Module, LoadError> {
        let bindings = loader.load(path)?;
        let module = Self::from_bindings(bindings, path, scope)?;
        info!(
            module = %module.name(),
            path = %path.display(),
            commands = module.commands().len(),
            callbacks = ?module.callbacks(),
            "Loaded scripted module"
        );
        Ok(module)
    }

    /// Wire script bindings into a module.
    ///
    /// Well-known callback names are bound when their shape matches the
    /// slot; mismatched shapes and unknown callables are ignored.
    pub fn from_bindings(
        bindings: ScriptBindings,
        path: &Path,
        scope: Scope,
    ) -> Result<Module, LoadError> {
        let (mut bindings, commands) = bindings.into_parts();

        let default_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = take_string(&mut bindings, VAR_NAME).unwrap_or(default_name);

        let mut builder = ModuleBuilder::new(name.clone()).scope(scope).path(path);
        if let Some(description) = take_string(&mut bindings, VAR_DESCRIPTION) {
            builder = builder.description(description);
        }
        if let Some(admin) = take_bool(&mut bindings, VAR_ADMIN) {
            builder = builder.admin(admin);
        }
        if let Some(global) = take_bool(&mut bindings, VAR_GLOBAL)
            && global != scope.is_global()
        {
            warn!(
                module = %name,
                declared_global = global,
                "Script scope disagrees with configuration, using configuration"
            );
        }

        for slot in [
            names::START,
            names::CHAT_MESSAGE,
            names::FRIEND_MESSAGE,
            names::SELF_CHAT_ENTER,
            names::CHAT_ENTER,
            names::CHAT_LEAVE,
        ] {
            let Some(binding) = bindings.remove(slot) else {
                continue;
            };
            builder = match (slot, binding) {
                (names::START, Binding::Start(f)) => builder.on_start(f),
                (names::CHAT_MESSAGE, Binding::ChatMessage(f)) => builder.on_chat_message(f),
                (names::FRIEND_MESSAGE, Binding::FriendMessage(f)) => builder.on_friend_message(f),
                (names::SELF_CHAT_ENTER, Binding::SelfChatEnter(f)) => {
                    builder.on_self_chat_enter(f)
                }
                (names::CHAT_ENTER, Binding::ChatEnter(f)) => builder.on_chat_enter(f),
                (names::CHAT_LEAVE, Binding::ChatLeave(f)) => builder.on_chat_leave(f),
                (_, other) => {
                    debug!(module = %name, slot, shape = other.shape(), "Ignoring ill-typed binding");
                    builder
                }
            };
        }

        for (var, binding) in bindings {
            if var.starts_with('_') {
                continue;
            }
            match binding {
                Binding::Value(value) => builder = builder.variable(var, value),
                other => {
                    debug!(module = %name, binding = %var, shape = other.shape(), "Ignoring unknown binding");
                }
            }
        }

        for command in commands {
            builder = builder.command_with(command);
        }

        Ok(builder.build()?)
    }
}

fn take_string(
    bindings: &mut std::collections::BTreeMap<String, Binding>,
    name: &str,
) -> Option<String> {
    match bindings.remove(name)? {
        Binding::Value(toml::Value::String(s)) => Some(s),
        other => {
            debug!(binding = name, shape = other.shape(), "Expected a string");
            None
        }
    }
}

fn take_bool(
    bindings: &mut std::collections::BTreeMap<String, Binding>,
    name: &str,
) -> Option<bool> {
    match bindings.remove(name)? {
        Binding::Value(toml::Value::Boolean(b)) => Some(b),
        other => {
            debug!(binding = name, shape = other.shape(), "Expected a boolean");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::module::callbacks::{command, on_chat_leave, on_chat_message, on_start};
    use crate::state::RoomId;

    fn bindings() -> ScriptBindings {
        let mut b = ScriptBindings::new();
        b.bind("Name", Binding::Value("quotes".into()));
        b.bind("Description", Binding::Value("Remembers quotes".into()));
        b.bind("Admin", Binding::Value(true.into()));
        b.bind("Start", Binding::Start(on_start(|_| async { Ok(()) })));
        b.bind(
            "OnChatMessage",
            Binding::ChatMessage(on_chat_message(|_, _, _| async { Ok(()) })),
        );
        // Wrong shape for the slot: ignored.
        b.bind(
            "OnFriendMessage",
            Binding::ChatLeave(on_chat_leave(|_, _| async { Ok(()) })),
        );
        // Not a well-known name: ignored.
        b.bind("Helper", Binding::Start(on_start(|_| async { Ok(()) })));
        b.bind("limit", Binding::Value(toml::Value::Integer(10)));
        b.bind("_secret", Binding::Value("hidden".into()));
        b.add_command(Command::new(
            ["quote"],
            "Random quote",
            command(|_, _, _| async { Ok(()) }),
        ));
        b
    }

    #[test]
    fn test_from_bindings_wires_well_known_names() {
        let module =
            Module::from_bindings(bindings(), Path::new("mods/q.toml"), Scope::Room(RoomId::new(3)))
                .unwrap();

        assert_eq!(module.name(), "quotes");
        assert_eq!(module.description(), "Remembers quotes");
        assert!(module.is_admin());
        assert_eq!(module.room(), Ok(RoomId::new(3)));
        assert_eq!(module.callbacks().bound(), vec!["Start", "OnChatMessage"]);
        assert_eq!(module.commands().len(), 1);
        assert_eq!(module.path(), Some(Path::new("mods/q.toml")));

        let vars: Vec<_> = module.variables().keys().cloned().collect();
        assert_eq!(vars, vec!["limit"]);
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let module =
            Module::from_bindings(ScriptBindings::new(), Path::new("mods/greeter.toml"), Scope::Global)
                .unwrap();
        assert_eq!(module.name(), "greeter");
        assert!(module.callbacks().bound().is_empty());
    }
}
