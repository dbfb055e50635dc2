//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_admin_path, default_bot_name, default_builtin_modules, default_command_char,
};
use crate::module::Scope;
use crate::state::RoomId;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Bot identity and command syntax.
    #[serde(default)]
    pub bot: BotConfig,
    /// Admin list persistence.
    #[serde(default)]
    pub admins: AdminsConfig,
    /// Callback execution limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Modules to activate at startup.
    #[serde(default)]
    pub modules: ModulesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Prefix prepended to a command's first token (e.g. "!").
    #[serde(default = "default_command_char")]
    pub command_char: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            command_char: default_command_char(),
        }
    }
}

/// Admin list configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminsConfig {
    /// Newline-delimited identity file (created if missing).
    #[serde(default = "default_admin_path")]
    pub path: PathBuf,
}

impl Default for AdminsConfig {
    fn default() -> Self {
        Self {
            path: default_admin_path(),
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound for a single callback, in milliseconds. Unset means
    /// callbacks run to completion.
    #[serde(default)]
    pub callback_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn callback_timeout(&self) -> Option<Duration> {
        self.callback_timeout_ms.map(Duration::from_millis)
    }
}

/// Module activation lists.
#[derive(Debug, Clone, Deserialize)]
pub struct ModulesConfig {
    /// Native modules by name (`help`, `dice`, `admin`).
    #[serde(default = "default_builtin_modules")]
    pub builtin: Vec<BuiltinModuleConfig>,
    /// Scripted module files.
    #[serde(default)]
    pub script: Vec<ScriptModuleConfig>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            builtin: default_builtin_modules(),
            script: Vec::new(),
        }
    }
}

/// Where a module lives: everywhere, or one room.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScopeConfig {
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub room: Option<u64>,
}

impl ScopeConfig {
    pub fn global() -> Self {
        Self {
            global: true,
            room: None,
        }
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.room.map(RoomId::new)
    }

    /// The module scope, or `None` when the entry is unbound or names both.
    pub fn scope(&self) -> Option<Scope> {
        match (self.global, self.room_id()) {
            (true, None) => Some(Scope::Global),
            (false, Some(room)) => Some(Scope::Room(room)),
            _ => None,
        }
    }
}

/// A native module entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinModuleConfig {
    pub name: String,
    #[serde(flatten)]
    pub scope: ScopeConfig,
}

/// A scripted module entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptModuleConfig {
    pub path: PathBuf,
    #[serde(flatten)]
    pub scope: ScopeConfig,
}
