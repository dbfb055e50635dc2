//! Network boundary.
//!
//! Inbound [`Event`]s come from a transport, outbound text leaves through an
//! [`Outbound`] implementation. The bundled transport is a line-oriented
//! console ([`console`]).

pub mod console;
mod events;
mod outbound;

pub use events::{
    ChatMemberInfo, ChatMessage, Event, FriendMessage, MemberChange, MessageEvent,
    PersonaStateChange, SelfChatEnter, tokenize,
};
pub use outbound::{Outbound, Recipient};
