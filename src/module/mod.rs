//! Modules: self-contained units of bot behavior.
//!
//! A module owns a command registry and a sparse set of event callbacks,
//! and is either global or bound to a single room. Modules are built once at
//! startup (natively through [`ModuleBuilder`] or from a script through
//! [`Module::from_script`]) and are read-only while events are dispatched.

pub mod callbacks;

mod builder;
mod context;
mod dispatch;
mod index;
mod script;

pub use builder::ModuleBuilder;
pub use callbacks::EventCallbacks;
pub use context::{Capabilities, ModuleContext};
pub use dispatch::{Dispatched, Suppression};
pub use index::{CommandInfo, ModuleIndex, ModuleInfo};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::commands::CommandRegistry;
use crate::error::ModuleError;
use crate::state::RoomId;

/// Whether a module has an implicit room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Room(RoomId),
}

impl Scope {
    /// Whether a module with this scope takes part in an event from `room`
    /// (`None` for events without a room).
    pub fn admits(self, room: Option<RoomId>) -> bool {
        match (self, room) {
            (Self::Global, _) => true,
            (Self::Room(own), Some(room)) => own == room,
            (Self::Room(_), None) => false,
        }
    }

    pub fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }
}

/// One unit of bot behavior.
#[derive(Debug)]
pub struct Module {
    name: String,
    description: String,
    scope: Scope,
    admin: bool,
    commands: CommandRegistry,
    callbacks: EventCallbacks,
    variables: BTreeMap<String, toml::Value>,
    path: Option<PathBuf>,
}

impl Module {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_global(&self) -> bool {
        self.scope.is_global()
    }

    /// Every command in this module requires an admin invoker.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// The bound room.
    ///
    /// Asking a global module for its room is a contract violation and
    /// returns [`ModuleError::GlobalHasNoRoom`].
    pub fn room(&self) -> Result<RoomId, ModuleError> {
        match self.scope {
            Scope::Room(room) => Ok(room),
            Scope::Global => Err(ModuleError::GlobalHasNoRoom {
                module: self.name.clone(),
            }),
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn callbacks(&self) -> &EventCallbacks {
        &self.callbacks
    }

    /// Script-declared variables (private `_names` excluded).
    pub fn variables(&self) -> &BTreeMap<String, toml::Value> {
        &self.variables
    }

    /// Source file for scripted modules.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_admits() {
        let r1 = RoomId::new(1);
        let r2 = RoomId::new(2);
        assert!(Scope::Global.admits(None));
        assert!(Scope::Global.admits(Some(r1)));
        assert!(Scope::Room(r1).admits(Some(r1)));
        assert!(!Scope::Room(r1).admits(Some(r2)));
        assert!(!Scope::Room(r1).admits(None));
    }

    #[test]
    fn test_room_on_global_module_is_typed_error() {
        let module = Module::builder("greeter").global().build().unwrap();
        assert_eq!(
            module.room(),
            Err(ModuleError::GlobalHasNoRoom {
                module: "greeter".into()
            })
        );

        let bound = Module::builder("greeter")
            .room(RoomId::new(9))
            .build()
            .unwrap();
        assert_eq!(bound.room(), Ok(RoomId::new(9)));
    }
}
