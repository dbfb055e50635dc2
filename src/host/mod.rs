//! Module host.
//!
//! Owns the active module set and routes inbound events to each
//! interested module. The set is fixed once [`HostBuilder::build`] runs;
//! module code sees it only through the read-only [`ModuleIndex`].

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::Config;
use crate::error::{LoadError, OutboundError};
use crate::module::{Capabilities, Dispatched, Module, ModuleContext, ModuleIndex, ModuleInfo, Scope};
use crate::network::{Event, Outbound, Recipient};
use crate::scripting::ScriptLoader;
use crate::state::{PersonaState, UserDirectory};

/// Collects modules before the host starts.
pub struct HostBuilder {
    command_char: String,
    callback_timeout: Option<Duration>,
    outbound: Arc<dyn Outbound>,
    users: Arc<UserDirectory>,
    modules: Vec<Module>,
}

impl HostBuilder {
    pub fn new(outbound: Arc<dyn Outbound>, users: Arc<UserDirectory>) -> Self {
        Self {
            command_char: "!".to_string(),
            callback_timeout: None,
            outbound,
            users,
            modules: Vec::new(),
        }
    }

    /// Builder seeded with the command character and callback limit from
    /// `config`.
    pub fn from_config(
        config: &Config,
        outbound: Arc<dyn Outbound>,
        users: Arc<UserDirectory>,
    ) -> Self {
        Self::new(outbound, users)
            .command_char(config.bot.command_char.clone())
            .callback_timeout(config.dispatch.callback_timeout())
    }

    pub fn command_char(mut self, command_char: impl Into<String>) -> Self {
        self.command_char = command_char.into();
        self
    }

    pub fn callback_timeout(mut self, limit: Option<Duration>) -> Self {
        self.callback_timeout = limit;
        self
    }

    /// Add a module. Registration order is dispatch order.
    pub fn module(mut self, module: Module) -> Self {
        self.add_module(module);
        self
    }

    pub fn add_module(&mut self, module: Module) {
        debug!(module = %module.name(), scope = ?module.scope(), "Registering module");
        self.modules.push(module);
    }

    /// Load one scripted module. A failure affects this module only.
    pub fn load_script(
        &mut self,
        loader: &dyn ScriptLoader,
        path: &Path,
        scope: Scope,
    ) -> Result<(), LoadError> {
        let module = Module::from_script(loader, path, scope)?;
        self.add_module(module);
        Ok(())
    }

    /// Load every script in `entries`, logging and collecting failures.
    pub fn load_scripts<'a, I>(&mut self, loader: &dyn ScriptLoader, entries: I) -> Vec<LoadError>
    where
        I: IntoIterator<Item = (&'a Path, Scope)>,
    {
        let mut failures = Vec::new();
        for (path, scope) in entries {
            if let Err(e) = self.load_script(loader, path, scope) {
                error!(
                    path = %path.display(),
                    code = e.error_code(),
                    error = %e,
                    "Failed to load scripted module"
                );
                failures.push(e);
            }
        }
        failures
    }

    pub fn build(self) -> SteamNerd {
        for module in &self.modules {
            for command in module.commands().shadowed() {
                warn!(
                    module = %module.name(),
                    command = %command.tokens().join(" "),
                    "Command pattern is shadowed by an earlier registration and will never match"
                );
            }
        }

        let index = Arc::new(ModuleIndex::new(&self.modules));
        let caps = Arc::new(Capabilities {
            outbound: self.outbound,
            users: self.users,
            index,
            command_char: self.command_char,
            callback_timeout: self.callback_timeout,
        });

        let contexts = self
            .modules
            .iter()
            .map(|m| ModuleContext::new(m.name(), m.scope(), Arc::clone(&caps)))
            .collect();

        info!(
            modules = self.modules.len(),
            command_char = %caps.command_char,
            timeout_ms = caps.callback_timeout.map(|d| d.as_millis() as u64),
            "Module host ready"
        );

        SteamNerd {
            modules: self.modules,
            contexts,
            caps,
            started: AtomicBool::new(false),
        }
    }
}

/// The running bot: active modules plus shared capabilities.
pub struct SteamNerd {
    modules: Vec<Module>,
    /// One context per module, same order as `modules`.
    contexts: Vec<ModuleContext>,
    caps: Arc<Capabilities>,
    started: AtomicBool,
}

impl SteamNerd {
    pub fn builder(outbound: Arc<dyn Outbound>, users: Arc<UserDirectory>) -> HostBuilder {
        HostBuilder::new(outbound, users)
    }

    /// Run every module's `Start` slot. Only the first call does anything.
    pub async fn start(&self) -> Vec<(String, Dispatched)> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("Modules already started");
            return Vec::new();
        }

        let mut outcomes = Vec::with_capacity(self.modules.len());
        for (module, ctx) in self.modules.iter().zip(&self.contexts) {
            let outcome = module.start(ctx.clone()).await;
            outcomes.push((module.name().to_string(), outcome));
        }
        let failed = outcomes.iter().filter(|(_, o)| o.is_failed()).count();
        info!(modules = outcomes.len(), failed, "Modules started");
        outcomes
    }

    /// Route one event to every interested module, in registration order.
    ///
    /// Returns one outcome per routed module. A failing module never stops
    /// delivery to the modules after it.
    pub async fn handle_event(&self, event: &Event) -> Vec<(String, Dispatched)> {
        let span = info_span!("event", kind = event.kind(), room = ?event.room());
        self.route(event).instrument(span).await
    }

    async fn route(&self, event: &Event) -> Vec<(String, Dispatched)> {
        let users = &self.caps.users;
        let invoker_is_admin = match event {
            Event::ChatMessage(m) => {
                users
                    .lookup_or_create(m.sender, "", PersonaState::Online)
                    .is_admin
            }
            Event::FriendMessage(m) => {
                users
                    .lookup_or_create(m.sender, "", PersonaState::Online)
                    .is_admin
            }
            Event::PersonaState(p) => {
                users.update_presence(p.user, &p.name, p.state);
                false
            }
            Event::SelfChatEnter(_) | Event::ChatLeave(_) => false,
        };

        let mut outcomes = Vec::new();
        for (module, ctx) in self.modules.iter().zip(&self.contexts) {
            if !routes_to(module, event) {
                continue;
            }
            let outcome = module.dispatch(ctx.clone(), event, invoker_is_admin).await;
            debug!(module = %module.name(), outcome = ?outcome, "Dispatched");
            outcomes.push((module.name().to_string(), outcome));
        }
        outcomes
    }

    /// Send a message on behalf of the host itself.
    pub async fn send_message(&self, text: &str, to: Recipient) -> Result<(), OutboundError> {
        self.caps.outbound.send_message(text, to).await
    }

    /// Look up a module as seen from `from`.
    pub fn module(&self, name: &str, from: Scope) -> Option<&ModuleInfo> {
        self.caps.index.lookup(name, from)
    }

    /// Modules visible from `from`.
    pub fn modules(&self, from: Scope) -> Vec<&ModuleInfo> {
        self.caps.index.visible(from)
    }

    pub fn index(&self) -> &ModuleIndex {
        &self.caps.index
    }

    pub fn users(&self) -> &UserDirectory {
        &self.caps.users
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Whether `module` takes part in `event`.
fn routes_to(module: &Module, event: &Event) -> bool {
    match event {
        Event::FriendMessage(_) => true,
        // Presence changes outside a room only feed the user directory.
        Event::PersonaState(p) if p.room.is_none() => false,
        _ => module.scope().admits(event.room()),
    }
}
