//! Callback slot types.
//!
//! Each well-known event has its own function shape. A module holds at most
//! one callback per slot; an empty slot means the module does not listen to
//! that event. Callbacks are async and report failure through
//! `anyhow::Result`, which the dispatch boundary contains.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::ModuleContext;
use crate::network::{ChatMemberInfo, ChatMessage, FriendMessage, MessageEvent};
use crate::network::{PersonaStateChange, SelfChatEnter};

/// Future returned by every callback.
pub type CallbackFuture = BoxFuture<'static, anyhow::Result<()>>;

pub type StartFn = Arc<dyn Fn(ModuleContext) -> CallbackFuture + Send + Sync>;
pub type ChatMessageFn =
    Arc<dyn Fn(ModuleContext, ChatMessage, Vec<String>) -> CallbackFuture + Send + Sync>;
pub type FriendMessageFn =
    Arc<dyn Fn(ModuleContext, FriendMessage, Vec<String>) -> CallbackFuture + Send + Sync>;
pub type SelfChatEnterFn = Arc<dyn Fn(ModuleContext, SelfChatEnter) -> CallbackFuture + Send + Sync>;
pub type ChatEnterFn =
    Arc<dyn Fn(ModuleContext, PersonaStateChange) -> CallbackFuture + Send + Sync>;
pub type ChatLeaveFn = Arc<dyn Fn(ModuleContext, ChatMemberInfo) -> CallbackFuture + Send + Sync>;

/// Command callback: the triggering message and the tokens left after the
/// command pattern.
pub type CommandFn =
    Arc<dyn Fn(ModuleContext, MessageEvent, Vec<String>) -> CallbackFuture + Send + Sync>;

/// Well-known slot names, as looked up in script bindings.
pub mod names {
    pub const START: &str = "Start";
    pub const CHAT_MESSAGE: &str = "OnChatMessage";
    pub const FRIEND_MESSAGE: &str = "OnFriendMessage";
    pub const SELF_CHAT_ENTER: &str = "OnSelfChatEnter";
    pub const CHAT_ENTER: &str = "OnChatEnter";
    pub const CHAT_LEAVE: &str = "OnChatLeave";
}

/// Optional callback per event slot.
#[derive(Clone, Default)]
pub struct EventCallbacks {
    pub start: Option<StartFn>,
    pub chat_message: Option<ChatMessageFn>,
    pub friend_message: Option<FriendMessageFn>,
    pub self_chat_enter: Option<SelfChatEnterFn>,
    pub chat_enter: Option<ChatEnterFn>,
    pub chat_leave: Option<ChatLeaveFn>,
}

impl EventCallbacks {
    /// Names of the bound slots, for logging.
    pub fn bound(&self) -> Vec<&'static str> {
        [
            (self.start.is_some(), names::START),
            (self.chat_message.is_some(), names::CHAT_MESSAGE),
            (self.friend_message.is_some(), names::FRIEND_MESSAGE),
            (self.self_chat_enter.is_some(), names::SELF_CHAT_ENTER),
            (self.chat_enter.is_some(), names::CHAT_ENTER),
            (self.chat_leave.is_some(), names::CHAT_LEAVE),
        ]
        .into_iter()
        .filter_map(|(bound, name)| bound.then_some(name))
        .collect()
    }
}

impl std::fmt::Debug for EventCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.bound()).finish()
    }
}

// ============================================================================
// Constructors from async closures
// ============================================================================

pub fn on_start<F, Fut>(f: F) -> StartFn
where
    F: Fn(ModuleContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

pub fn on_chat_message<F, Fut>(f: F) -> ChatMessageFn
where
    F: Fn(ModuleContext, ChatMessage, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, msg, args| f(ctx, msg, args).boxed())
}

pub fn on_friend_message<F, Fut>(f: F) -> FriendMessageFn
where
    F: Fn(ModuleContext, FriendMessage, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, msg, args| f(ctx, msg, args).boxed())
}

pub fn on_self_chat_enter<F, Fut>(f: F) -> SelfChatEnterFn
where
    F: Fn(ModuleContext, SelfChatEnter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, ev| f(ctx, ev).boxed())
}

pub fn on_chat_enter<F, Fut>(f: F) -> ChatEnterFn
where
    F: Fn(ModuleContext, PersonaStateChange) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, ev| f(ctx, ev).boxed())
}

pub fn on_chat_leave<F, Fut>(f: F) -> ChatLeaveFn
where
    F: Fn(ModuleContext, ChatMemberInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, ev| f(ctx, ev).boxed())
}

pub fn command<F, Fut>(f: F) -> CommandFn
where
    F: Fn(ModuleContext, MessageEvent, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, msg, args| f(ctx, msg, args).boxed())
}
