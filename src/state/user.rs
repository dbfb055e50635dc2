//! User records and the admin directory.
//!
//! The `UserDirectory` caches one `User` per observed identity for the
//! lifetime of the process and owns the admin set, which is backed by an
//! append-only, newline-delimited file of rendered identities.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::SteamId;
use crate::error::DirectoryError;

/// Last-known presence of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersonaState {
    #[default]
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
}

/// A user observed on the network.
#[derive(Debug, Clone)]
pub struct User {
    pub id: SteamId,
    pub name: String,
    pub state: PersonaState,
    pub is_admin: bool,
    pub last_seen: DateTime<Utc>,
}

/// Maps identities to user records and tracks admins.
pub struct UserDirectory {
    path: PathBuf,
    admins: RwLock<BTreeSet<SteamId>>,
    users: DashMap<SteamId, User>,
    /// Serializes promotions so file order matches commit order.
    promote_lock: Mutex<()>,
}

impl UserDirectory {
    /// Load the admin list at `path`, creating an empty file if missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref().to_path_buf();
        let admins = read_admin_file(&path)?;
        info!(path = %path.display(), count = admins.len(), "Loaded admin list");

        Ok(Self {
            path,
            admins: RwLock::new(admins),
            users: DashMap::new(),
            promote_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_admin(&self, id: SteamId) -> bool {
        self.admins.read().contains(&id)
    }

    /// Snapshot of the admin set, ordered by identity.
    pub fn admins(&self) -> Vec<SteamId> {
        self.admins.read().iter().copied().collect()
    }

    /// Promote `id` to admin.
    ///
    /// The identity is appended and flushed to disk before the in-memory set
    /// or any cached record changes, so a failed write leaves both stores as
    /// they were. Returns `Ok(false)` when `id` already is an admin.
    pub fn promote(&self, id: SteamId) -> Result<bool, DirectoryError> {
        let _guard = self.promote_lock.lock();

        if self.is_admin(id) {
            debug!(id = %id, "Already an admin");
            return Ok(false);
        }

        append_admin(&self.path, id).map_err(|source| {
            warn!(id = %id, error = %source, "Failed to persist admin");
            DirectoryError::Persist { id, source }
        })?;

        self.admins.write().insert(id);
        if let Some(mut user) = self.users.get_mut(&id) {
            user.is_admin = true;
        }

        info!(id = %id, "Promoted to admin");
        Ok(true)
    }

    /// Return the cached record for `id`, creating it on first sight.
    ///
    /// A new record's admin flag is stamped from the current admin set.
    pub fn lookup_or_create(&self, id: SteamId, name: &str, state: PersonaState) -> User {
        self.users
            .entry(id)
            .or_insert_with(|| {
                debug!(id = %id, name = %name, "Adding user");
                User {
                    id,
                    name: name.to_string(),
                    state,
                    is_admin: self.is_admin(id),
                    last_seen: Utc::now(),
                }
            })
            .clone()
    }

    pub fn user(&self, id: SteamId) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    /// Refresh name and presence, creating the record if needed.
    pub fn update_presence(&self, id: SteamId, name: &str, state: PersonaState) -> User {
        let mut entry = self.users.entry(id).or_insert_with(|| User {
            id,
            name: name.to_string(),
            state,
            is_admin: self.is_admin(id),
            last_seen: Utc::now(),
        });
        if !name.is_empty() {
            entry.name = name.to_string();
        }
        entry.state = state;
        entry.last_seen = Utc::now();
        entry.clone()
    }
}

fn read_admin_file(path: &Path) -> Result<BTreeSet<SteamId>, DirectoryError> {
    let io_err = |source| DirectoryError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(io_err)?;

    let mut admins = BTreeSet::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }

        let id = value
            .parse::<SteamId>()
            .map_err(|source| DirectoryError::InvalidIdentity {
                path: path.to_path_buf(),
                line: idx + 1,
                value: value.to_string(),
                source,
            })?;
        admins.insert(id);
    }
    Ok(admins)
}

fn append_admin(path: &Path, id: SteamId) -> std::io::Result<()> {
    let mut file: File = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    // A hand-edited list may lack the final newline.
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }

    writeln!(file, "{}", id.render())?;
    file.flush()?;
    file.sync_all()
}
