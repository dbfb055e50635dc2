//! Inbound network events.
//!
//! The transport produces these; the host routes them to modules. Payloads
//! are plain owned data so callbacks can hold them across await points.

use crate::network::Recipient;
use crate::state::{PersonaState, RoomId, SteamId};

/// A message posted in a chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: RoomId,
    pub sender: SteamId,
    pub text: String,
}

/// A direct message from a friend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendMessage {
    pub sender: SteamId,
    pub text: String,
}

/// The bot itself entered a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfChatEnter {
    pub room: RoomId,
}

/// A peer's presence changed. With `room` set this is the "entered room"
/// signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaStateChange {
    pub user: SteamId,
    pub name: String,
    pub state: PersonaState,
    pub room: Option<RoomId>,
}

/// How a member left a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    Left,
    Disconnected,
    Kicked,
    Banned,
}

/// A member left a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatMemberInfo {
    pub room: RoomId,
    pub user: SteamId,
    pub change: MemberChange,
}

/// Every event the host routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChatMessage(ChatMessage),
    FriendMessage(FriendMessage),
    SelfChatEnter(SelfChatEnter),
    PersonaState(PersonaStateChange),
    ChatLeave(ChatMemberInfo),
}

impl Event {
    /// Room the event belongs to, if any.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::ChatMessage(m) => Some(m.room),
            Self::FriendMessage(_) => None,
            Self::SelfChatEnter(e) => Some(e.room),
            Self::PersonaState(p) => p.room,
            Self::ChatLeave(l) => Some(l.room),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatMessage(_) => "chat_message",
            Self::FriendMessage(_) => "friend_message",
            Self::SelfChatEnter(_) => "self_chat_enter",
            Self::PersonaState(_) => "persona_state",
            Self::ChatLeave(_) => "chat_leave",
        }
    }
}

/// A message event as handed to command callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    Chat(ChatMessage),
    Friend(FriendMessage),
}

impl MessageEvent {
    pub fn sender(&self) -> SteamId {
        match self {
            Self::Chat(m) => m.sender,
            Self::Friend(m) => m.sender,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Chat(m) => &m.text,
            Self::Friend(m) => &m.text,
        }
    }

    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::Chat(m) => Some(m.room),
            Self::Friend(_) => None,
        }
    }

    /// Where a reply to this message should go.
    pub fn origin(&self) -> Recipient {
        match self {
            Self::Chat(m) => Recipient::Room(m.room),
            Self::Friend(m) => Recipient::User(m.sender),
        }
    }
}

/// Split a message body on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}
