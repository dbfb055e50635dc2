//! State management module.
//!
//! Contains network identities and the user/admin directory.

mod identity;
mod user;

pub use identity::{IdentityError, RoomId, SteamId};
pub use user::{PersonaState, User, UserDirectory};
