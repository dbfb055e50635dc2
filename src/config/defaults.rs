//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::path::PathBuf;

use super::types::{BuiltinModuleConfig, ScopeConfig};

pub fn default_bot_name() -> String {
    "SteamNerd".to_string()
}

pub fn default_command_char() -> String {
    "!".to_string()
}

pub fn default_admin_path() -> PathBuf {
    PathBuf::from("admins.txt")
}

/// All native modules, global.
pub fn default_builtin_modules() -> Vec<BuiltinModuleConfig> {
    ["help", "dice", "admin"]
        .into_iter()
        .map(|name| BuiltinModuleConfig {
            name: name.to_string(),
            scope: ScopeConfig::global(),
        })
        .collect()
}
