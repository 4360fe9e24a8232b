//! Per-chat participant roster — activity records and house assignments.
//!
//! Every inbound message upserts its sender here; the roster is what the
//! engine means by "active chat members". Membership status comes from the
//! platform collaborator and degrades to `Unknown` when lookups fail, which
//! quietly drops the user out of random-selection pools and championship
//! rankings.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, Result};
use crate::house::House;
use crate::store::Store;
use crate::types::{ChatId, MemberStatus, UserId};

/// One participant's roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// The participant.
    pub user: UserId,
    /// Name the participant is rendered as.
    pub display_name: String,
    /// Stored membership status.
    pub status: MemberStatus,
    /// House assignment, if sorted.
    pub house: Option<House>,
    /// Last time the participant was seen speaking.
    pub last_seen: DateTime<Utc>,
}

impl RosterEntry {
    /// The participant's house for rules purposes: unsorted means
    /// [`House::Unaffiliated`].
    #[must_use]
    pub fn house_or_unaffiliated(&self) -> House {
        self.house.unwrap_or(House::Unaffiliated)
    }
}

/// Roster operations, backed by the store.
#[derive(Debug)]
pub struct Roster<'a> {
    store: &'a Store,
}

impl<'a> Roster<'a> {
    /// Wrap the store.
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Upsert a participant's activity record from an inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn record_activity(
        &self,
        chat: ChatId,
        user: UserId,
        display_name: &str,
        status: MemberStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store.record_activity(chat, user, display_name, status, now)
    }

    /// Degrade a participant's stored status after a failed platform lookup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn mark_unknown(&self, chat: ChatId, user: UserId) -> Result<()> {
        self.store.set_status(chat, user, MemberStatus::Unknown)
    }

    /// Assign a participant to a house.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MemberNotFound`] when the roster has
    /// never seen the participant, or [`crate::EngineError::Database`] on
    /// SQLite failures.
    pub fn assign_house(&self, chat: ChatId, user: UserId, house: House) -> Result<()> {
        if self.store.assign_house(chat, user, house)? {
            Ok(())
        } else {
            Err(EngineError::MemberNotFound { chat, user })
        }
    }

    /// One participant's roster row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn member(&self, chat: ChatId, user: UserId) -> Result<Option<RosterEntry>> {
        self.store.member(chat, user)
    }

    /// Look a participant up by display name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn member_by_name(&self, chat: ChatId, name: &str) -> Result<Option<RosterEntry>> {
        self.store.member_by_name(chat, name)
    }

    /// Every active participant, most recently seen first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn active_members(&self, chat: ChatId) -> Result<Vec<RosterEntry>> {
        self.store.active_members(chat)
    }

    /// Active participants whose last activity predates `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn idle_since(&self, chat: ChatId, cutoff: DateTime<Utc>) -> Result<Vec<RosterEntry>> {
        let mut members = self.active_members(chat)?;
        members.retain(|m| m.last_seen < cutoff);
        Ok(members)
    }
}
