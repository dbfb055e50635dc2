//! SteamNerd - modular chat bot core.
//!
//! Modules own commands and event callbacks; the [`host::SteamNerd`] host
//! routes inbound network events to them with permission and room-scope
//! gating, and contains every callback failure at the module boundary.

pub mod builtin;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod module;
pub mod network;
pub mod scripting;
pub mod state;
