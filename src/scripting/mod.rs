//! Script loading boundary.
//!
//! A [`ScriptLoader`] turns a file into a bag of named [`Binding`]s. The
//! module side (`Module::from_script`) picks out the well-known names it
//! understands and ignores everything else, so loaders never need to know
//! about module internals.

mod toml_loader;

pub use toml_loader::TomlScriptLoader;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::commands::Command;
use crate::error::LoadError;
use crate::module::callbacks::{
    ChatEnterFn, ChatLeaveFn, ChatMessageFn, FriendMessageFn, SelfChatEnterFn, StartFn,
};

/// A named value produced by a script.
#[derive(Clone)]
pub enum Binding {
    Start(StartFn),
    ChatMessage(ChatMessageFn),
    FriendMessage(FriendMessageFn),
    SelfChatEnter(SelfChatEnterFn),
    ChatEnter(ChatEnterFn),
    ChatLeave(ChatLeaveFn),
    /// A declared variable.
    Value(toml::Value),
}

impl Binding {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::ChatMessage(_) => "chat_message",
            Self::FriendMessage(_) => "friend_message",
            Self::SelfChatEnter(_) => "self_chat_enter",
            Self::ChatEnter(_) => "chat_enter",
            Self::ChatLeave(_) => "chat_leave",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            other => write!(f, "Binding::<{}>", other.shape()),
        }
    }
}

/// Everything a script declared.
#[derive(Debug, Clone, Default)]
pub struct ScriptBindings {
    bindings: BTreeMap<String, Binding>,
    commands: Vec<Command>,
}

impl ScriptBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding of the same name.
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    /// Commands the script registered, in order.
    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn into_parts(self) -> (BTreeMap<String, Binding>, Vec<Command>) {
        (self.bindings, self.commands)
    }
}

/// Produces bindings from a script file.
pub trait ScriptLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<ScriptBindings, LoadError>;
}
