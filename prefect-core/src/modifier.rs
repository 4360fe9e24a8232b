//! Time-boxed rule overlays — Boosts and Blocks.
//!
//! A modifier changes how the ledger responds to peer reactions for one
//! house until it expires. Expiry is lazy: every read first purges the
//! chat's dead modifiers, so a dormant chat may hold a logically-expired
//! row until activity resumes. There is no background timer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::house::House;
use crate::store::Store;
use crate::types::ChatId;

/// What a modifier does to positive peer-reaction deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Positive peer deltas are doubled.
    Boost,
    /// Positive peer deltas are suppressed entirely.
    Block,
}

impl ModifierKind {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boost => "boost",
            Self::Block => "block",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boost" => Some(Self::Boost),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// A live rule overlay on one house of one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    /// The chat the overlay applies to.
    pub chat: ChatId,
    /// Boost or Block.
    pub kind: ModifierKind,
    /// The house whose incoming reactions are altered.
    pub house: House,
    /// When the overlay stops applying.
    pub expires_at: DateTime<Utc>,
}

/// Registry of the active modifiers, backed by the store.
#[derive(Debug)]
pub struct ModifierRegistry<'a> {
    store: &'a Store,
}

impl<'a> ModifierRegistry<'a> {
    /// Wrap the store.
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// The modifier currently in force for a house, if any.
    ///
    /// Purges every expired modifier of the chat first, then returns the
    /// most recently installed survivor for the house.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn active_modifier(
        &self,
        chat: ChatId,
        house: House,
        now: DateTime<Utc>,
    ) -> Result<Option<Modifier>> {
        self.store.purge_expired_modifiers(chat, now)?;
        self.store.latest_modifier(chat, house)
    }

    /// Install a new modifier lasting `ttl_seconds` from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn install(
        &self,
        chat: ChatId,
        kind: ModifierKind,
        house: House,
        ttl_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<Modifier> {
        let expires_at = now + Duration::seconds(ttl_seconds);
        self.store.insert_modifier(chat, kind, house, expires_at)?;
        info!(
            chat = %chat,
            kind = kind.as_str(),
            house = %house,
            ttl_seconds,
            "modifier installed"
        );
        Ok(Modifier {
            chat,
            kind,
            house,
            expires_at,
        })
    }
}
