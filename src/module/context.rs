//! The handle module callbacks use to act on the bot.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{ModuleIndex, ModuleInfo, Scope};
use crate::error::{ModuleError, SayError};
use crate::network::{MessageEvent, Outbound, Recipient};
use crate::state::{RoomId, UserDirectory};

/// Host-wide capabilities shared by every module context.
pub struct Capabilities {
    pub outbound: Arc<dyn Outbound>,
    pub users: Arc<UserDirectory>,
    pub index: Arc<ModuleIndex>,
    /// Prefix marking a command's first token.
    pub command_char: String,
    /// Upper bound for a single callback, if any.
    pub callback_timeout: Option<Duration>,
}

/// Per-module view of the host, handed to every callback.
#[derive(Clone)]
pub struct ModuleContext {
    module: Arc<str>,
    scope: Scope,
    caps: Arc<Capabilities>,
}

impl ModuleContext {
    pub fn new(module: &str, scope: Scope, caps: Arc<Capabilities>) -> Self {
        Self {
            module: Arc::from(module),
            scope,
            caps,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_global(&self) -> bool {
        self.scope.is_global()
    }

    pub fn command_char(&self) -> &str {
        &self.caps.command_char
    }

    pub fn callback_timeout(&self) -> Option<Duration> {
        self.caps.callback_timeout
    }

    /// The module's bound room; a typed error on global modules.
    pub fn room(&self) -> Result<RoomId, ModuleError> {
        match self.scope {
            Scope::Room(room) => Ok(room),
            Scope::Global => Err(ModuleError::GlobalHasNoRoom {
                module: self.module.to_string(),
            }),
        }
    }

    /// Send `text` to `to`, or to the module's room when `to` is `None`.
    ///
    /// Global modules have no room, so omitting the recipient fails with
    /// [`ModuleError::RecipientRequired`] before anything is sent.
    pub async fn say(&self, text: &str, to: Option<Recipient>) -> Result<(), SayError> {
        let to = match (to, self.scope) {
            (Some(to), _) => to,
            (None, Scope::Room(room)) => Recipient::Room(room),
            (None, Scope::Global) => {
                return Err(ModuleError::RecipientRequired {
                    module: self.module.to_string(),
                }
                .into());
            }
        };

        debug!(module = %self.module, to = %to, "Sending message");
        self.caps.outbound.send_message(text, to).await?;
        Ok(())
    }

    /// Answer a message where it came from: its room, or the sender of a
    /// direct message.
    pub async fn reply(&self, event: &MessageEvent, text: &str) -> Result<(), SayError> {
        self.say(text, Some(event.origin())).await
    }

    /// Look up a module visible from this one.
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.caps.index.lookup(name, self.scope)
    }

    /// All modules visible from this one.
    pub fn modules(&self) -> Vec<&ModuleInfo> {
        self.caps.index.visible(self.scope)
    }

    /// Shared handle, so blocking directory work can move onto another thread.
    pub fn users(&self) -> &Arc<UserDirectory> {
        &self.caps.users
    }
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.module)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
