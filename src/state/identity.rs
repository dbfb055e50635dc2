//! Network identities: user accounts and chat rooms.
//!
//! `SteamId` packs universe, account type, instance and account number into
//! 64 bits. Individual public desktop accounts render in the legacy
//! `STEAM_0:Y:Z` form, which is also the form persisted in the admin list;
//! every other id renders as raw decimal so that rendering never loses bits.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const UNIVERSE_PUBLIC: u64 = 1;
const ACCOUNT_TYPE_INDIVIDUAL: u64 = 1;
const INSTANCE_DESKTOP: u64 = 1;

/// Identity parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("empty identity")]
    Empty,

    #[error("unrecognized identity format: {0}")]
    Format(String),

    #[error("identity component out of range: {0}")]
    Range(String),
}

/// A user account identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    /// Build an individual public account id from its 32-bit account number.
    pub fn from_account_id(account_id: u32) -> Self {
        Self(
            (UNIVERSE_PUBLIC << 56)
                | (ACCOUNT_TYPE_INDIVIDUAL << 52)
                | (INSTANCE_DESKTOP << 32)
                | u64::from(account_id),
        )
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Lower 32 bits: the account number.
    pub fn account_id(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    /// Whether the legacy form carries every bit of this id.
    fn is_legacy_renderable(&self) -> bool {
        self.0 >> 56 == UNIVERSE_PUBLIC
            && (self.0 >> 52) & 0xF == ACCOUNT_TYPE_INDIVIDUAL
            && (self.0 >> 32) & 0xF_FFFF == INSTANCE_DESKTOP
    }

    /// Render in the persisted form.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_legacy_renderable() {
            let account = self.account_id();
            write!(f, "STEAM_0:{}:{}", account & 1, account >> 1)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for SteamId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentityError::Empty);
        }

        if let Some(rest) = s.strip_prefix("STEAM_") {
            return parse_legacy(rest).ok_or_else(|| IdentityError::Format(s.to_string()))?;
        }

        if let Some(inner) = s.strip_prefix("[U:1:").and_then(|r| r.strip_suffix(']')) {
            let account = inner
                .parse::<u32>()
                .map_err(|_| IdentityError::Range(s.to_string()))?;
            return Ok(Self::from_account_id(account));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let raw = s
                .parse::<u64>()
                .map_err(|_| IdentityError::Range(s.to_string()))?;
            return Ok(Self(raw));
        }

        Err(IdentityError::Format(s.to_string()))
    }
}

/// Parse `X:Y:Z` after the `STEAM_` prefix. Outer `None` means malformed.
fn parse_legacy(rest: &str) -> Option<Result<SteamId, IdentityError>> {
    let mut parts = rest.split(':');
    let universe = parts.next()?.parse::<u8>().ok()?;
    let low_bit = parts.next()?.parse::<u32>().ok()?;
    let high = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() || universe > 1 || low_bit > 1 {
        return None;
    }

    let account = match high.checked_mul(2).and_then(|h| h.checked_add(low_bit)) {
        Some(a) => a,
        None => return Some(Err(IdentityError::Range(format!("STEAM_{rest}")))),
    };
    Some(Ok(SteamId::from_account_id(account)))
}

/// A chat room identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(u64);

impl RoomId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentityError::Empty);
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| IdentityError::Format(s.to_string()))
    }
}
