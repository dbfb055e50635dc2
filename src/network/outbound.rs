//! Outbound message capability.

use std::fmt;

use async_trait::async_trait;

use crate::error::OutboundError;
use crate::state::{RoomId, SteamId};

/// Destination of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    Room(RoomId),
    User(SteamId),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(room) => write!(f, "room {room}"),
            Self::User(user) => write!(f, "user {user}"),
        }
    }
}

impl From<RoomId> for Recipient {
    fn from(room: RoomId) -> Self {
        Self::Room(room)
    }
}

impl From<SteamId> for Recipient {
    fn from(user: SteamId) -> Self {
        Self::User(user)
    }
}

/// Sends text to the network on behalf of modules.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send_message(&self, text: &str, to: Recipient) -> Result<(), OutboundError>;
}
