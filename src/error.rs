//! Unified error handling for steamnerd.
//!
//! This module provides the error hierarchy for the bot: module contract
//! violations, contained callback failures, directory I/O, script loading,
//! and outbound delivery. Every enum exposes a static `error_code()` used as
//! a structured log field.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::state::{IdentityError, SteamId};

// ============================================================================
// Module Errors (contract violations by module code)
// ============================================================================

/// Errors raised when a module is used against its scope contract.
///
/// These are never swallowed by the dispatch boundary: they surface to the
/// module code that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module {module} is global and does not have a chatroom")]
    GlobalHasNoRoom { module: String },

    #[error("module {module} is global, so a receiver must be supplied")]
    RecipientRequired { module: String },

    #[error("module {module} is neither global nor bound to a room")]
    Unbound { module: String },
}

impl ModuleError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GlobalHasNoRoom { .. } => "global_has_no_room",
            Self::RecipientRequired { .. } => "recipient_required",
            Self::Unbound { .. } => "unbound_module",
        }
    }
}

// ============================================================================
// Callback Errors (contained at the dispatch boundary)
// ============================================================================

/// Failure of a single module callback invocation.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("callback failed: {0:#}")]
    Failed(#[from] anyhow::Error),

    #[error("callback panicked: {0}")]
    Panicked(String),

    #[error("callback timed out after {0:?}")]
    TimedOut(Duration),
}

impl CallbackError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "callback_failed",
            Self::Panicked(_) => "callback_panicked",
            Self::TimedOut(_) => "callback_timeout",
        }
    }
}

// ============================================================================
// Outbound Errors
// ============================================================================

/// Errors from the outbound send capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutboundError {
    #[error("not connected")]
    Disconnected,

    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Errors from `ModuleContext::say`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SayError {
    #[error(transparent)]
    Scope(#[from] ModuleError),

    #[error(transparent)]
    Send(#[from] OutboundError),
}

impl SayError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Scope(e) => e.error_code(),
            Self::Send(OutboundError::Disconnected) => "disconnected",
            Self::Send(OutboundError::Rejected(_)) => "send_rejected",
        }
    }
}

// ============================================================================
// Directory Errors (admin list persistence)
// ============================================================================

/// Admin directory errors.
///
/// Load errors are fatal at startup; persist errors are returned from
/// `promote` after the in-memory state has been left untouched.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to open admin list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid identity on line {line} of {path}: {value:?}")]
    InvalidIdentity {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: IdentityError,
    },

    #[error("failed to persist admin {id}: {source}")]
    Persist {
        id: SteamId,
        #[source]
        source: std::io::Error,
    },
}

impl DirectoryError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "directory_io",
            Self::InvalidIdentity { .. } => "invalid_identity",
            Self::Persist { .. } => "persist_failed",
        }
    }
}

// ============================================================================
// Load Errors (scripted modules)
// ============================================================================

/// Errors that abort loading a single scripted module.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl LoadError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "script_read",
            Self::Parse { .. } => "script_parse",
            Self::Module(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_error_codes() {
        let err = ModuleError::GlobalHasNoRoom {
            module: "dice".into(),
        };
        assert_eq!(err.error_code(), "global_has_no_room");
        assert!(err.to_string().contains("dice"));
    }

    #[test]
    fn test_say_error_wraps_scope() {
        let err: SayError = ModuleError::RecipientRequired {
            module: "help".into(),
        }
        .into();
        assert_eq!(err.error_code(), "recipient_required");
        assert!(matches!(err, SayError::Scope(_)));
    }

    #[test]
    fn test_callback_error_from_anyhow() {
        let err: CallbackError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_code(), "callback_failed");
        assert!(err.to_string().contains("boom"));
    }
}
