//! Core identity and time types for the prefect engine.
//!
//! Chats, users, and messages are identified by the numeric ids the chat
//! platform hands us; terms get their own random id so a rollover can never
//! collide with an earlier season of the same chat.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a group chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Unique identifier for a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Platform identifier for a single message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Unique identifier for a competitive term ("season") of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermId(pub Uuid);

impl TermId {
    /// Create a new random term ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TermId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// A participant's standing within a chat, as reported by the platform.
///
/// Lookups that fail degrade to [`MemberStatus::Unknown`], which excludes the
/// user from random-selection pools and championship rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Ordinary group member.
    Member,
    /// Group administrator.
    Admin,
    /// The group's creator.
    Creator,
    /// Left the group voluntarily.
    Left,
    /// Removed from the group.
    Kicked,
    /// Lookup failed or the platform returned something unexpected.
    Unknown,
}

impl MemberStatus {
    /// Whether the member counts as an active participant.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Member | Self::Admin | Self::Creator)
    }

    /// Whether the member may use administrator-only operations.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Creator)
    }

    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Creator => "creator",
            Self::Left => "left",
            Self::Kicked => "kicked",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the storage representation; anything unrecognised is `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "member" => Self::Member,
            "admin" => Self::Admin,
            "creator" => Self::Creator,
            "left" => Self::Left,
            "kicked" => Self::Kicked,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Time helpers
// ---------------------------------------------------------------------------

/// Reconstruct a UTC timestamp from whole seconds stored in the database.
///
/// Out-of-range values collapse to the epoch rather than poisoning a row.
#[must_use]
pub fn ts_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_status_round_trips() {
        for status in [
            MemberStatus::Member,
            MemberStatus::Admin,
            MemberStatus::Creator,
            MemberStatus::Left,
            MemberStatus::Kicked,
            MemberStatus::Unknown,
        ] {
            assert_eq!(MemberStatus::parse(status.as_str()), status);
        }
        assert_eq!(MemberStatus::parse("banana"), MemberStatus::Unknown);
    }

    #[test]
    fn active_and_admin_flags() {
        assert!(MemberStatus::Member.is_active());
        assert!(MemberStatus::Creator.is_active());
        assert!(!MemberStatus::Left.is_active());
        assert!(!MemberStatus::Unknown.is_active());

        assert!(MemberStatus::Admin.is_admin());
        assert!(MemberStatus::Creator.is_admin());
        assert!(!MemberStatus::Member.is_admin());
    }

    #[test]
    fn timestamp_round_trip() {
        let now = Utc::now();
        let restored = ts_from_secs(now.timestamp());
        assert_eq!(restored.timestamp(), now.timestamp());
    }
}
