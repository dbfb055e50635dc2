//! Module dispatch surface.
//!
//! Every callback runs inside [`contain`]: errors, panics and (optionally)
//! overruns are caught, logged and turned into a [`Dispatched::Failed`]
//! value. Nothing a callback does can unwind past this boundary.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, error};

use super::callbacks::{CallbackFuture, names};
use super::{Module, ModuleContext};
use crate::error::CallbackError;
use crate::network::{Event, MessageEvent, tokenize};

/// Why a bound callback was not invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Admin-only module or command, invoker is not an admin.
    NotAdmin,
}

/// Outcome of dispatching one event to one module.
#[derive(Debug)]
pub enum Dispatched {
    /// No callback is bound for this event.
    Skipped,
    /// A callback is bound but a gate refused the invocation.
    Suppressed(Suppression),
    /// A callback ran to completion. `command` holds the resolved command
    /// pattern when the command path was taken.
    Completed {
        slot: &'static str,
        command: Option<Vec<String>>,
    },
    /// The callback failed; already logged.
    Failed {
        slot: &'static str,
        error: CallbackError,
    },
}

impl Dispatched {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

const COMMAND_SLOT: &str = "Command";

impl Module {
    /// Run the `Start` slot.
    pub async fn start(&self, ctx: ModuleContext) -> Dispatched {
        let Some(f) = self.callbacks.start.clone() else {
            return Dispatched::Skipped;
        };
        let limit = ctx.callback_timeout();
        contain(&self.name, names::START, limit, None, move || f(ctx)).await
    }

    /// Route one event through this module's callbacks.
    ///
    /// `invoker_is_admin` is the admin flag of the message sender; it is
    /// ignored for events without an invoking user.
    pub async fn dispatch(
        &self,
        ctx: ModuleContext,
        event: &Event,
        invoker_is_admin: bool,
    ) -> Dispatched {
        let limit = ctx.callback_timeout();
        match event {
            Event::ChatMessage(msg) => {
                self.dispatch_message(ctx, MessageEvent::Chat(msg.clone()), invoker_is_admin)
                    .await
            }
            Event::FriendMessage(msg) => {
                self.dispatch_message(ctx, MessageEvent::Friend(msg.clone()), invoker_is_admin)
                    .await
            }
            Event::SelfChatEnter(ev) => {
                let Some(f) = self.callbacks.self_chat_enter.clone() else {
                    return Dispatched::Skipped;
                };
                let ev = *ev;
                contain(&self.name, names::SELF_CHAT_ENTER, limit, None, move || f(ctx, ev)).await
            }
            Event::PersonaState(ev) => {
                let Some(f) = self.callbacks.chat_enter.clone() else {
                    return Dispatched::Skipped;
                };
                let ev = ev.clone();
                contain(&self.name, names::CHAT_ENTER, limit, None, move || f(ctx, ev)).await
            }
            Event::ChatLeave(ev) => {
                let Some(f) = self.callbacks.chat_leave.clone() else {
                    return Dispatched::Skipped;
                };
                let ev = *ev;
                contain(&self.name, names::CHAT_LEAVE, limit, None, move || f(ctx, ev)).await
            }
        }
    }

    /// Command path first; raw message slot as fallback.
    async fn dispatch_message(
        &self,
        ctx: ModuleContext,
        msg: MessageEvent,
        invoker_is_admin: bool,
    ) -> Dispatched {
        let limit = ctx.callback_timeout();
        let tokens = tokenize(msg.text());
        let in_room = msg.room().is_some();

        if let Some(res) = self.commands.resolve(ctx.command_char(), &tokens) {
            let command = res.command;
            if command.visibility().admits(in_room) {
                if (self.admin || command.is_admin_only()) && !invoker_is_admin {
                    debug!(
                        module = %self.name,
                        command = %command.tokens().join(" "),
                        sender = %msg.sender(),
                        "Suppressed command for non-admin"
                    );
                    return Dispatched::Suppressed(Suppression::NotAdmin);
                }

                let f = command.callback().clone();
                let args = res.remaining(&tokens).to_vec();
                let pattern = command.tokens().to_vec();
                return contain(&self.name, COMMAND_SLOT, limit, Some(pattern), move || {
                    f(ctx, msg, args)
                })
                .await;
            }
            debug!(
                module = %self.name,
                command = %command.tokens().join(" "),
                visibility = ?command.visibility(),
                "Command not usable here, falling back to message handler"
            );
        }

        match msg {
            MessageEvent::Chat(m) => {
                let Some(f) = self.callbacks.chat_message.clone() else {
                    return Dispatched::Skipped;
                };
                if self.admin && !invoker_is_admin {
                    return Dispatched::Suppressed(Suppression::NotAdmin);
                }
                contain(&self.name, names::CHAT_MESSAGE, limit, None, move || {
                    f(ctx, m, tokens)
                })
                .await
            }
            MessageEvent::Friend(m) => {
                let Some(f) = self.callbacks.friend_message.clone() else {
                    return Dispatched::Skipped;
                };
                if self.admin && !invoker_is_admin {
                    return Dispatched::Suppressed(Suppression::NotAdmin);
                }
                contain(&self.name, names::FRIEND_MESSAGE, limit, None, move || {
                    f(ctx, m, tokens)
                })
                .await
            }
        }
    }
}

/// Invoke a callback with failure containment.
///
/// Covers errors returned by the callback, panics raised while building or
/// polling its future, and overruns of `limit`.
async fn contain<F>(
    module: &str,
    slot: &'static str,
    limit: Option<Duration>,
    command: Option<Vec<String>>,
    invoke: F,
) -> Dispatched
where
    F: FnOnce() -> CallbackFuture,
{
    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(invoke)) {
        Ok(fut) => {
            let guarded = AssertUnwindSafe(fut).catch_unwind();
            match limit {
                Some(limit) => match tokio::time::timeout(limit, guarded).await {
                    Ok(result) => flatten(result),
                    Err(_) => Err(CallbackError::TimedOut(limit)),
                },
                None => flatten(guarded.await),
            }
        }
        Err(panic) => Err(CallbackError::Panicked(panic_message(panic.as_ref()))),
    };

    match outcome {
        Ok(()) => Dispatched::Completed { slot, command },
        Err(e) => {
            error!(
                module = %module,
                slot = slot,
                code = e.error_code(),
                error = %e,
                "Module callback failed"
            );
            Dispatched::Failed { slot, error: e }
        }
    }
}

fn flatten(
    result: Result<anyhow::Result<()>, Box<dyn Any + Send>>,
) -> Result<(), CallbackError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(CallbackError::Failed(e)),
        Err(panic) => Err(CallbackError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
