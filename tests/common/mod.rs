//! Integration test common infrastructure.
//!
//! Provides a recording outbound sink, a recorder for observing callback
//! invocations, and a harness that owns a temporary admin list.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use steamnerd::error::OutboundError;
use steamnerd::host::HostBuilder;
use steamnerd::network::{ChatMessage, Event, FriendMessage, Outbound, Recipient};
use steamnerd::state::{RoomId, SteamId, UserDirectory};
use tempfile::TempDir;

/// Outbound sink that remembers every message.
#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<(Recipient, String)>>,
    reject: AtomicBool,
}

impl RecordingOutbound {
    pub fn sent(&self) -> Vec<(Recipient, String)> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Make every following send fail.
    pub fn reject_all(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send_message(&self, text: &str, to: Recipient) -> Result<(), OutboundError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(OutboundError::Rejected("test sink".into()));
        }
        self.sent.lock().push((to, text.to_string()));
        Ok(())
    }
}

/// Shared log for callbacks to write into.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Temporary admin list plus a recording sink.
pub struct Harness {
    pub dir: TempDir,
    pub outbound: Arc<RecordingOutbound>,
    pub users: Arc<UserDirectory>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_admins(&[])
    }

    pub fn with_admins(admins: &[SteamId]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("admins.txt");
        let content: String = admins.iter().map(|id| format!("{id}\n")).collect();
        std::fs::write(&path, content).expect("write admin list");
        let users = Arc::new(UserDirectory::load(&path).expect("load admin list"));
        Self {
            dir,
            outbound: Arc::new(RecordingOutbound::default()),
            users,
        }
    }

    pub fn admin_path(&self) -> PathBuf {
        self.dir.path().join("admins.txt")
    }

    pub fn builder(&self) -> HostBuilder {
        HostBuilder::new(self.outbound.clone(), self.users.clone())
    }
}

pub fn user(account: u32) -> SteamId {
    SteamId::from_account_id(account)
}

pub fn room(id: u64) -> RoomId {
    RoomId::new(id)
}

pub fn chat(room_id: u64, sender: SteamId, text: &str) -> Event {
    Event::ChatMessage(ChatMessage {
        room: room(room_id),
        sender,
        text: text.to_string(),
    })
}

pub fn friend(sender: SteamId, text: &str) -> Event {
    Event::FriendMessage(FriendMessage {
        sender,
        text: text.to_string(),
    })
}
