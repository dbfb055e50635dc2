//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup validation

mod defaults;
mod types;
mod validation;

pub use types::{
    AdminsConfig, BotConfig, BuiltinModuleConfig, Config, ConfigError, DispatchConfig,
    ModulesConfig, ScopeConfig, ScriptModuleConfig,
};
pub use validation::{ValidationError, validate};
