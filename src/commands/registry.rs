//! Per-module command registry.
//!
//! Commands are kept in registration order. Registration never rejects a
//! pattern: a later command with the same tokens as an earlier one can never
//! win resolution, and `shadowed()` reports such entries for startup logs.

use std::fmt;

use crate::module::callbacks::CommandFn;

/// Where a command may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Shared rooms only.
    Public,
    /// Direct messages only.
    Private,
    /// Either.
    #[default]
    Both,
}

impl Visibility {
    /// Whether a command of this class may run for a message from a room
    /// (`in_room`) or a direct message.
    pub fn admits(self, in_room: bool) -> bool {
        match self {
            Self::Public => in_room,
            Self::Private => !in_room,
            Self::Both => true,
        }
    }
}

/// A registered command. Immutable once registered.
#[derive(Clone)]
pub struct Command {
    tokens: Vec<String>,
    help: String,
    callback: CommandFn,
    visibility: Visibility,
    admin_only: bool,
}

impl Command {
    pub fn new<I, S>(tokens: I, help: impl Into<String>, callback: CommandFn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            help: help.into(),
            callback,
            visibility: Visibility::Both,
            admin_only: false,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Require the invoker to be an admin even if the module is not
    /// admin-only.
    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    /// Match tokens; the first is the command name.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn name(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn callback(&self) -> &CommandFn {
        &self.callback
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_admin_only(&self) -> bool {
        self.admin_only
    }

    /// Usage string with the command prefix, e.g. `!roll dice`.
    pub fn usage(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.tokens.join(" "))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("tokens", &self.tokens)
            .field("help", &self.help)
            .field("visibility", &self.visibility)
            .field("admin_only", &self.admin_only)
            .finish_non_exhaustive()
    }
}

/// Ordered list of a module's commands.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Commands whose token pattern repeats an earlier registration and can
    /// therefore never be resolved.
    pub fn shadowed(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .enumerate()
            .filter(|(idx, cmd)| {
                self.commands[..*idx]
                    .iter()
                    .any(|earlier| earlier.tokens == cmd.tokens)
            })
            .map(|(_, cmd)| cmd)
            .collect()
    }
}
