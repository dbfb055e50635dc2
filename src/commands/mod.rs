//! Command registration and resolution.

mod matcher;
mod registry;

pub use matcher::Resolution;
pub use registry::{Command, CommandRegistry, Visibility};
