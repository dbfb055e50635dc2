//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use super::types::ScopeConfig;
use crate::builtin;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.command_char must not be empty")]
    EmptyCommandChar,
    #[error("bot.command_char must not contain whitespace, got '{0}'")]
    WhitespaceCommandChar(String),
    #[error("dispatch.callback_timeout_ms must be greater than zero")]
    ZeroTimeout,
    #[error("unknown builtin module '{0}'")]
    UnknownBuiltin(String),
    #[error("module '{0}' must set either global = true or room")]
    UnboundModule(String),
    #[error("module '{0}' cannot be both global and bound to a room")]
    AmbiguousScope(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let command_char = &config.bot.command_char;
    if command_char.is_empty() {
        errors.push(ValidationError::EmptyCommandChar);
    } else if command_char.chars().any(char::is_whitespace) {
        errors.push(ValidationError::WhitespaceCommandChar(command_char.clone()));
    }

    if config.dispatch.callback_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    for entry in &config.modules.builtin {
        if !builtin::NAMES.contains(&entry.name.as_str()) {
            errors.push(ValidationError::UnknownBuiltin(entry.name.clone()));
        }
        check_scope(&entry.name, &entry.scope, &mut errors);
    }

    for entry in &config.modules.script {
        check_scope(&entry.path.display().to_string(), &entry.scope, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_scope(label: &str, scope: &ScopeConfig, errors: &mut Vec<ValidationError>) {
    match (scope.global, scope.room) {
        (false, None) => errors.push(ValidationError::UnboundModule(label.to_string())),
        (true, Some(_)) => errors.push(ValidationError::AmbiguousScope(label.to_string())),
        _ => {}
    }
}
