//! Programmatic module construction.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::callbacks::{
    ChatEnterFn, ChatLeaveFn, ChatMessageFn, CommandFn, EventCallbacks, FriendMessageFn,
    SelfChatEnterFn, StartFn,
};
use super::{Module, Scope};
use crate::commands::{Command, CommandRegistry, Visibility};
use crate::error::ModuleError;
use crate::state::RoomId;

/// Builder for [`Module`].
#[must_use]
pub struct ModuleBuilder {
    name: String,
    description: String,
    scope: Option<Scope>,
    admin: bool,
    commands: CommandRegistry,
    callbacks: EventCallbacks,
    variables: BTreeMap<String, toml::Value>,
    path: Option<PathBuf>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scope: None,
            admin: false,
            commands: CommandRegistry::new(),
            callbacks: EventCallbacks::default(),
            variables: BTreeMap::new(),
            path: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn global(self) -> Self {
        self.scope(Scope::Global)
    }

    pub fn room(self, room: RoomId) -> Self {
        self.scope(Scope::Room(room))
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// Register a command usable everywhere.
    pub fn command<I, S>(self, tokens: I, help: impl Into<String>, callback: CommandFn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_with(Command::new(tokens, help, callback))
    }

    /// Register a command with an explicit visibility class.
    pub fn command_visible<I, S>(
        self,
        tokens: I,
        help: impl Into<String>,
        callback: CommandFn,
        visibility: Visibility,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_with(Command::new(tokens, help, callback).with_visibility(visibility))
    }

    pub fn command_with(mut self, command: Command) -> Self {
        self.commands.register(command);
        self
    }

    pub fn on_start(mut self, f: StartFn) -> Self {
        self.callbacks.start = Some(f);
        self
    }

    pub fn on_chat_message(mut self, f: ChatMessageFn) -> Self {
        self.callbacks.chat_message = Some(f);
        self
    }

    pub fn on_friend_message(mut self, f: FriendMessageFn) -> Self {
        self.callbacks.friend_message = Some(f);
        self
    }

    pub fn on_self_chat_enter(mut self, f: SelfChatEnterFn) -> Self {
        self.callbacks.self_chat_enter = Some(f);
        self
    }

    pub fn on_chat_enter(mut self, f: ChatEnterFn) -> Self {
        self.callbacks.chat_enter = Some(f);
        self
    }

    pub fn on_chat_leave(mut self, f: ChatLeaveFn) -> Self {
        self.callbacks.chat_leave = Some(f);
        self
    }

    pub fn callbacks(mut self, callbacks: EventCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: toml::Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Finish the module. A module must be global or bound to a room.
    pub fn build(self) -> Result<Module, ModuleError> {
        let scope = self.scope.ok_or_else(|| ModuleError::Unbound {
            module: self.name.clone(),
        })?;

        Ok(Module {
            name: self.name,
            description: self.description,
            scope,
            admin: self.admin,
            commands: self.commands,
            callbacks: self.callbacks,
            variables: self.variables,
            path: self.path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::callbacks::{command, on_start};

    #[test]
    fn test_unbound_module_is_rejected() {
        let err = ModuleBuilder::new("lonely").build().unwrap_err();
        assert_eq!(err.error_code(), "unbound_module");
    }

    #[test]
    fn test_builder_collects_everything() {
        let module = ModuleBuilder::new("dice")
            .description("Rolls dice")
            .global()
            .admin(true)
            .command(["roll"], "Roll a die", command(|_, _, _| async { Ok(()) }))
            .command_visible(
                ["roll", "secret"],
                "Roll privately",
                command(|_, _, _| async { Ok(()) }),
                Visibility::Private,
            )
            .on_start(on_start(|_| async { Ok(()) }))
            .variable("sides", toml::Value::Integer(6))
            .build()
            .unwrap();

        assert_eq!(module.name(), "dice");
        assert_eq!(module.description(), "Rolls dice");
        assert!(module.is_global());
        assert!(module.is_admin());
        assert_eq!(module.commands().len(), 2);
        assert_eq!(module.callbacks().bound(), vec!["Start"]);
        assert_eq!(module.variables()["sides"], toml::Value::Integer(6));
    }
}
