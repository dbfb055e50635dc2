//! Read-only snapshot of the active modules.
//!
//! Module code looks other modules up through this index rather than the
//! host's module set, so callbacks never hold references to live modules.

use std::collections::BTreeMap;

use super::{Module, Scope};
use crate::commands::Visibility;

/// Summary of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub tokens: Vec<String>,
    pub help: String,
    pub visibility: Visibility,
    pub admin_only: bool,
}

impl CommandInfo {
    pub fn usage(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.tokens.join(" "))
    }
}

/// Summary of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
    pub scope: Scope,
    pub admin: bool,
    pub commands: Vec<CommandInfo>,
    /// Variables the module declared, readable by other modules.
    pub variables: BTreeMap<String, toml::Value>,
}

impl ModuleInfo {
    pub fn of(module: &Module) -> Self {
        Self {
            name: module.name().to_string(),
            description: module.description().to_string(),
            scope: module.scope(),
            admin: module.is_admin(),
            commands: module
                .commands()
                .iter()
                .map(|c| CommandInfo {
                    tokens: c.tokens().to_vec(),
                    help: c.help().to_string(),
                    visibility: c.visibility(),
                    admin_only: c.is_admin_only(),
                })
                .collect(),
            variables: module.variables().clone(),
        }
    }

    /// Whether a caller with scope `from` may see this module: global
    /// callers see everything; room callers see global modules and their
    /// own room's modules.
    fn visible_from(&self, from: Scope) -> bool {
        match from {
            Scope::Global => true,
            Scope::Room(room) => self.scope.admits(Some(room)),
        }
    }
}

/// Modules in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: Vec<ModuleInfo>,
}

impl ModuleIndex {
    pub fn new<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Self {
        Self {
            modules: modules.into_iter().map(ModuleInfo::of).collect(),
        }
    }

    /// First module named `name` (case-insensitive) visible from `from`.
    pub fn lookup(&self, name: &str, from: Scope) -> Option<&ModuleInfo> {
        self.modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name) && m.visible_from(from))
    }

    pub fn visible(&self, from: Scope) -> Vec<&ModuleInfo> {
        self.modules.iter().filter(|m| m.visible_from(from)).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
