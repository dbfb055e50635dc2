//! Console loopback transport.
//!
//! Reads one event per line and prints outbound messages, so modules can be
//! exercised without a network connection.
//!
//! ```text
//! chat <room> <sender> <text...>
//! friend <sender> <text...>
//! enter <room>
//! join <room> <user> <name...>
//! leave <room> <user>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use super::{
    ChatMemberInfo, ChatMessage, Event, FriendMessage, MemberChange, Outbound, PersonaStateChange,
    Recipient, SelfChatEnter,
};
use crate::error::OutboundError;
use crate::host::SteamNerd;
use crate::state::{IdentityError, PersonaState, RoomId, SteamId};

/// Longest accepted input line, in bytes.
const MAX_LINE_LENGTH: usize = 4096;

/// A console line that does not describe an event.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown event kind: {0}")]
    UnknownKind(String),
    #[error("{kind}: missing {field}")]
    Missing {
        kind: &'static str,
        field: &'static str,
    },
    #[error("{kind}: invalid room: {value}")]
    Room { kind: &'static str, value: String },
    #[error("{kind}: invalid user {value}: {source}")]
    User {
        kind: &'static str,
        value: String,
        #[source]
        source: IdentityError,
    },
}

/// Parse one console line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Event>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (kind, rest) = split_word(line);
    let event = match kind {
        "chat" => {
            let (room, rest) = split_word(rest);
            let (sender, text) = split_word(rest);
            Event::ChatMessage(ChatMessage {
                room: parse_room("chat", room)?,
                sender: parse_user("chat", sender)?,
                text: text.to_string(),
            })
        }
        "friend" => {
            let (sender, text) = split_word(rest);
            Event::FriendMessage(FriendMessage {
                sender: parse_user("friend", sender)?,
                text: text.to_string(),
            })
        }
        "enter" => {
            let (room, _) = split_word(rest);
            Event::SelfChatEnter(SelfChatEnter {
                room: parse_room("enter", room)?,
            })
        }
        "join" => {
            let (room, rest) = split_word(rest);
            let (user, name) = split_word(rest);
            Event::PersonaState(PersonaStateChange {
                room: Some(parse_room("join", room)?),
                user: parse_user("join", user)?,
                name: name.to_string(),
                state: PersonaState::Online,
            })
        }
        "leave" => {
            let (room, rest) = split_word(rest);
            let (user, _) = split_word(rest);
            Event::ChatLeave(ChatMemberInfo {
                room: parse_room("leave", room)?,
                user: parse_user("leave", user)?,
                change: MemberChange::Left,
            })
        }
        other => return Err(ParseError::UnknownKind(other.to_string())),
    };
    Ok(Some(event))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn parse_room(kind: &'static str, value: &str) -> Result<RoomId, ParseError> {
    if value.is_empty() {
        return Err(ParseError::Missing { kind, field: "room" });
    }
    value.parse().map_err(|_| ParseError::Room {
        kind,
        value: value.to_string(),
    })
}

fn parse_user(kind: &'static str, value: &str) -> Result<SteamId, ParseError> {
    if value.is_empty() {
        return Err(ParseError::Missing { kind, field: "user" });
    }
    value.parse().map_err(|source| ParseError::User {
        kind,
        value: value.to_string(),
        source,
    })
}

/// Prints outbound messages as `-> <recipient>: <text>`.
pub struct ConsoleOutbound<W = tokio::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleOutbound {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleOutbound<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Outbound for ConsoleOutbound<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_message(&self, text: &str, to: Recipient) -> Result<(), OutboundError> {
        let line = format!("-> {to}: {text}\n");
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|_| OutboundError::Disconnected)?;
        out.flush().await.map_err(|_| OutboundError::Disconnected)
    }
}

/// Feed events from `input` to `host` until end of input.
///
/// Events are handled one at a time. Returns the number of events handled.
pub async fn run<R>(host: &SteamNerd, input: R) -> anyhow::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(input, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut handled = 0usize;

    while let Some(result) = lines.next().await {
        let line = match result {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(max = MAX_LINE_LENGTH, "Console line too long, skipping");
                continue;
            }
            Err(LinesCodecError::Io(e)) => return Err(e.into()),
        };

        let event = match parse_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, line = %line, "Skipping malformed console line");
                continue;
            }
        };

        let outcomes = host.handle_event(&event).await;
        debug!(kind = event.kind(), modules = outcomes.len(), "Console event handled");
        handled += 1;
    }

    info!(events = handled, "Console input closed");
    Ok(handled)
}
